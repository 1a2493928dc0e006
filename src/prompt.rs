// Merging proposed edits onto an existing task

use crate::models::{Signifier, Status, Task, TaskPatch};
use chrono::NaiveDate;
use eyre::{Result, eyre};

/// Raw, source-agnostic edits for one task.
///
/// Values come in as user-typed strings from whatever front end collected
/// them; a missing or blank value means "keep the current value", except
/// for the name, which may not be blanked. Keeping this detached from any
/// input source is what makes edit validation testable.
#[derive(Debug, Clone, Default)]
pub struct EditInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub signifier: Option<String>,
    pub do_date: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
    pub estimated_duration: Option<String>,
}

/// Validate proposed edits against the existing record and produce the
/// partial update to apply.
///
/// Blank or missing fields are dropped, as are values identical to what is
/// already stored, so the resulting patch touches only real changes. A name
/// that trims to nothing, an unknown status, an unparsable date or a
/// non-numeric duration is an error and nothing is written.
pub fn merge_edits(existing: &Task, input: &EditInput) -> Result<TaskPatch> {
    let mut patch = TaskPatch::default();

    if let Some(name) = &input.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(eyre!("Task name cannot be empty"));
        }
        if name != existing.name {
            patch.name = Some(name.to_string());
        }
    }

    if let Some(description) = present(&input.description) {
        if existing.description.as_deref() != Some(&description) {
            patch.description = Some(description);
        }
    }

    if let Some(status) = present(&input.status) {
        let status =
            Status::parse(&status).ok_or_else(|| eyre!("Unknown status: {status}"))?;
        if status != existing.status {
            patch.status = Some(status);
        }
    }

    if let Some(signifier) = present(&input.signifier) {
        let signifier = Signifier::from(signifier);
        if existing.signifier.as_ref() != Some(&signifier) {
            patch.signifier = Some(signifier);
        }
    }

    if let Some(do_date) = present(&input.do_date) {
        let do_date = parse_date(&do_date)?;
        if existing.do_date != Some(do_date) {
            patch.do_date = Some(do_date);
        }
    }

    if let Some(due_date) = present(&input.due_date) {
        let due_date = parse_date(&due_date)?;
        if existing.due_date != Some(due_date) {
            patch.due_date = Some(due_date);
        }
    }

    if let Some(category) = present(&input.category) {
        if existing.category.as_deref() != Some(&category) {
            patch.category = Some(category);
        }
    }

    if let Some(estimated) = present(&input.estimated_duration) {
        let estimated: i64 = estimated
            .parse()
            .map_err(|_| eyre!("Estimated duration must be a whole number of minutes"))?;
        if estimated < 0 {
            return Err(eyre!("Estimated duration cannot be negative"));
        }
        if existing.estimated_duration != Some(estimated) {
            patch.estimated_duration = Some(estimated);
        }
    }

    Ok(patch)
}

/// Trimmed value when one was actually supplied, `None` for blank input
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| eyre!("Invalid date (expected YYYY-MM-DD): {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Task {
        Task {
            id: 1,
            name: "Write report".to_string(),
            description: Some("first draft".to_string()),
            status: Status::Incomplete,
            signifier: None,
            do_date: None,
            due_date: Some(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()),
            category: Some("work".to_string()),
            estimated_duration: Some(60),
            real_duration: None,
            start_time: None,
            end_time: None,
        }
    }

    #[test]
    fn test_blank_fields_keep_current_values() {
        let input = EditInput {
            description: Some("".to_string()),
            status: Some("  ".to_string()),
            category: None,
            ..EditInput::default()
        };
        let patch = merge_edits(&existing(), &input).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let input = EditInput {
            name: Some("".to_string()),
            ..EditInput::default()
        };
        assert!(merge_edits(&existing(), &input).is_err());
    }

    #[test]
    fn test_unchanged_values_are_dropped() {
        let input = EditInput {
            name: Some("Write report".to_string()),
            status: Some("incomplete".to_string()),
            category: Some("work".to_string()),
            estimated_duration: Some("60".to_string()),
            ..EditInput::default()
        };
        let patch = merge_edits(&existing(), &input).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_changed_fields_land_in_patch() {
        let input = EditInput {
            name: Some("Write final report".to_string()),
            status: Some("paused".to_string()),
            do_date: Some("2024-01-18".to_string()),
            estimated_duration: Some("90".to_string()),
            ..EditInput::default()
        };
        let patch = merge_edits(&existing(), &input).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Write final report"));
        assert_eq!(patch.status, Some(Status::Paused));
        assert_eq!(
            patch.do_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 18).unwrap())
        );
        assert_eq!(patch.estimated_duration, Some(90));
        assert!(patch.due_date.is_none());
        assert!(patch.category.is_none());
    }

    #[test]
    fn test_whitespace_name_is_rejected() {
        let input = EditInput {
            name: Some("   ".to_string()),
            ..EditInput::default()
        };
        assert!(merge_edits(&existing(), &input).is_err());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let input = EditInput {
            status: Some("done".to_string()),
            ..EditInput::default()
        };
        assert!(merge_edits(&existing(), &input).is_err());
    }

    #[test]
    fn test_bad_date_and_duration_are_rejected() {
        let input = EditInput {
            due_date: Some("tomorrow".to_string()),
            ..EditInput::default()
        };
        assert!(merge_edits(&existing(), &input).is_err());

        let input = EditInput {
            estimated_duration: Some("an hour".to_string()),
            ..EditInput::default()
        };
        assert!(merge_edits(&existing(), &input).is_err());

        let input = EditInput {
            estimated_duration: Some("-5".to_string()),
            ..EditInput::default()
        };
        assert!(merge_edits(&existing(), &input).is_err());
    }

    #[test]
    fn test_signifier_accepts_any_marker() {
        let input = EditInput {
            signifier: Some("important".to_string()),
            ..EditInput::default()
        };
        let patch = merge_edits(&existing(), &input).unwrap();
        assert_eq!(patch.signifier, Some(Signifier::Important));
    }
}
