// Data models for tasktrack

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// A single persisted task record, one row in the tasks table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Status,
    pub signifier: Option<Signifier>,
    pub do_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    /// Planned minutes, set at creation, never auto-updated
    pub estimated_duration: Option<i64>,
    /// Accumulated actual minutes, summed across all start/pause cycles
    pub real_duration: Option<i64>,
    /// Set while a timer is running, cleared on pause and complete
    pub start_time: Option<NaiveDateTime>,
    /// Set on completion only
    pub end_time: Option<NaiveDateTime>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn timer_running(&self) -> bool {
        self.start_time.is_some()
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Incomplete,
    InProgress,
    Paused,
    Cancelled,
    Completed,
}

impl Status {
    /// The exact strings stored in the status column
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Incomplete => "incomplete",
            Status::InProgress => "in-progress",
            Status::Paused => "paused",
            Status::Cancelled => "cancelled",
            Status::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "incomplete" => Some(Status::Incomplete),
            "in-progress" => Some(Status::InProgress),
            "paused" => Some(Status::Paused),
            "cancelled" => Some(Status::Cancelled),
            "completed" => Some(Status::Completed),
            _ => None,
        }
    }

    /// Checkbox glyph used when rendering a task line
    pub fn glyph(self) -> char {
        match self {
            Status::Incomplete => ' ',
            Status::InProgress => '/',
            Status::Paused => '^',
            Status::Cancelled => '-',
            Status::Completed => 'x',
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Status::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown status: {text}").into()))
    }
}

/// Bullet-journal style marker on a task, rendered as a glyph.
///
/// Stored as free text so rows written by other tools still load; anything
/// other than the two known markers round-trips through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Signifier {
    Important,
    Repeats,
    Other(String),
}

impl Signifier {
    pub fn as_str(&self) -> &str {
        match self {
            Signifier::Important => "important",
            Signifier::Repeats => "repeats",
            Signifier::Other(s) => s,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Signifier::Important => '*',
            Signifier::Repeats => '~',
            Signifier::Other(_) => '?',
        }
    }
}

impl From<String> for Signifier {
    fn from(s: String) -> Self {
        match s.as_str() {
            "important" => Signifier::Important,
            "repeats" => Signifier::Repeats,
            _ => Signifier::Other(s),
        }
    }
}

impl From<Signifier> for String {
    fn from(s: Signifier) -> Self {
        s.as_str().to_string()
    }
}

impl ToSql for Signifier {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str().to_string()))
    }
}

impl FromSql for Signifier {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(Signifier::from(value.as_str()?.to_string()))
    }
}

/// Caller-supplied fields for creating a task.
///
/// Status starts at `incomplete` and the timing fields start null, so
/// neither appears here.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
    pub signifier: Option<Signifier>,
    pub do_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub estimated_duration: Option<i64>,
}

/// Partial update: only fields present (`Some`) are written.
///
/// `start_time` carries a double `Option` because pausing must be able to
/// write NULL back to the column, not just overwrite it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub signifier: Option<Signifier>,
    pub do_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub estimated_duration: Option<i64>,
    pub real_duration: Option<i64>,
    pub start_time: Option<Option<NaiveDateTime>>,
    pub end_time: Option<NaiveDateTime>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.signifier.is_none()
            && self.do_date.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
            && self.estimated_duration.is_none()
            && self.real_duration.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}
