// SQLite-backed task store

use crate::models::{Status, Task, TaskDraft, TaskPatch};
use chrono::NaiveDate;
use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use std::fs;
use std::path::Path;
use tracing::debug;

const TASK_COLUMNS: &str = "id, name, description, status, signifier, do_date, due_date, \
     category, estimated_duration, real_duration, start_time, end_time";

/// Durable CRUD over task records plus the date-filtered queries.
///
/// One `Store` is opened per logical command and dropped when the command
/// finishes; the connection closes on every exit path. Each mutating call
/// commits on its own, there are no transactions spanning calls.
pub struct Store {
    db: Connection,
}

impl Store {
    /// Open or create a store at the given database path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;

        let store = Self { db };
        store.create_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { db };
        store.create_schema()?;
        Ok(store)
    }

    /// Create the tasks table if it does not exist.
    ///
    /// Column order is fixed for compatibility with databases written by
    /// earlier versions of the tool.
    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT,
                    status TEXT CHECK(status IN ('incomplete', 'in-progress', 'paused', 'cancelled', 'completed')) DEFAULT 'incomplete',
                    signifier TEXT,
                    do_date TEXT,
                    due_date TEXT,
                    category TEXT,
                    estimated_duration INTEGER,
                    real_duration INTEGER,
                    start_time TEXT NULL,
                    end_time TEXT NULL
                );
                "#,
            )
            .context("Failed to create tasks table")?;

        Ok(())
    }

    /// Insert a new task and return its assigned id.
    ///
    /// The name must be non-empty after trimming and the estimate, when
    /// given, non-negative; everything else is optional. Status starts at
    /// `incomplete`, the timing columns at NULL.
    pub fn create(&self, draft: &TaskDraft) -> Result<i64> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(eyre!("Task name cannot be empty"));
        }
        if matches!(draft.estimated_duration, Some(minutes) if minutes < 0) {
            return Err(eyre!("Estimated duration cannot be negative"));
        }

        self.db
            .execute(
                "INSERT INTO tasks (name, description, status, signifier, do_date, due_date, category, estimated_duration)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    name,
                    draft.description,
                    Status::Incomplete,
                    draft.signifier,
                    draft.do_date,
                    draft.due_date,
                    draft.category,
                    draft.estimated_duration,
                ],
            )
            .context("Failed to insert task")?;

        let id = self.db.last_insert_rowid();
        debug!(id, name, "Created task");
        Ok(id)
    }

    /// Fetch a task by id, `None` when no row matches
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .db
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                task_from_row,
            )
            .optional()
            .context("Failed to read task")?;
        Ok(task)
    }

    /// Overwrite only the fields present in the patch.
    ///
    /// Returns false when the patch is empty or no row matched the id; a
    /// missing row is routine here, not an error.
    pub fn update(&self, id: i64, patch: &TaskPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(eyre!("Task name cannot be empty"));
            }
            assignments.push("name = ?");
            params.push(Box::new(name.to_string()));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            params.push(Box::new(description.clone()));
        }
        if let Some(status) = patch.status {
            assignments.push("status = ?");
            params.push(Box::new(status));
        }
        if let Some(signifier) = &patch.signifier {
            assignments.push("signifier = ?");
            params.push(Box::new(signifier.clone()));
        }
        if let Some(do_date) = patch.do_date {
            assignments.push("do_date = ?");
            params.push(Box::new(do_date));
        }
        if let Some(due_date) = patch.due_date {
            assignments.push("due_date = ?");
            params.push(Box::new(due_date));
        }
        if let Some(category) = &patch.category {
            assignments.push("category = ?");
            params.push(Box::new(category.clone()));
        }
        if let Some(estimated) = patch.estimated_duration {
            assignments.push("estimated_duration = ?");
            params.push(Box::new(estimated));
        }
        if let Some(real) = patch.real_duration {
            assignments.push("real_duration = ?");
            params.push(Box::new(real));
        }
        if let Some(start_time) = patch.start_time {
            // Inner None writes NULL back, which is how a pause clears the timer
            assignments.push("start_time = ?");
            params.push(Box::new(start_time));
        }
        if let Some(end_time) = patch.end_time {
            assignments.push("end_time = ?");
            params.push(Box::new(end_time));
        }

        let query = format!("UPDATE tasks SET {} WHERE id = ?", assignments.join(", "));
        params.push(Box::new(id));

        let params_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let changed = self
            .db
            .execute(&query, params_refs.as_slice())
            .context("Failed to update task")?;

        debug!(id, changed, "Updated task");
        Ok(changed > 0)
    }

    /// Permanently remove a task; returns whether a row was deleted
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .db
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .context("Failed to delete task")?;
        debug!(id, deleted, "Deleted task");
        Ok(deleted > 0)
    }

    /// All tasks in insertion order
    pub fn list_all(&self) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"),
            &[],
        )
    }

    /// Tasks scheduled to be worked on exactly the given date
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE do_date = ?1"),
            &[&date],
        )
    }

    /// Tasks past their due date and not completed, soonest deadline first
    pub fn list_overdue(&self, today: NaiveDate) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE due_date < ?1 AND status != 'completed'
                 ORDER BY due_date ASC"
            ),
            &[&today],
        )
    }

    /// Tasks whose do date has slipped and which are not completed,
    /// oldest do date first
    pub fn list_to_reschedule(&self, today: NaiveDate) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE do_date < ?1 AND status != 'completed'
                 ORDER BY do_date ASC"
            ),
            &[&today],
        )
    }

    fn query_tasks(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(query)?;
        let rows = stmt.query_map(params, task_from_row)?;

        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task.context("Failed to read task row")?);
        }
        Ok(tasks)
    }
}

/// Map a row in tasks-table column order into a `Task`
fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        signifier: row.get(4)?,
        do_date: row.get(5)?,
        due_date: row.get(6)?,
        category: row.get(7)?,
        estimated_duration: row.get(8)?,
        real_duration: row.get(9)?,
        start_time: row.get(10)?,
        end_time: row.get(11)?,
    })
}
