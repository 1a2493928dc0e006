// Text rendering for tasks: glyphs, durations, timestamps

use crate::models::Task;
use chrono::NaiveDateTime;

const RULE_WIDTH: usize = 40;

/// Minutes as `HH:MM`; absent durations show as `00:00`
pub fn format_duration(minutes: Option<i64>) -> String {
    let minutes = minutes.unwrap_or(0).max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Timestamp as `YYYY-MM-DD HH:MM:SS`, `N/A` when absent
pub fn format_time(time: Option<NaiveDateTime>) -> String {
    match time {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

/// Multi-line card for one task.
///
/// First line carries the signifier and status glyphs, the second the
/// category and description, the third the dates and the
/// `real // estimated` duration pair.
pub fn render_task(task: &Task) -> String {
    let mut out = String::new();

    let marker = task.signifier.as_ref().map_or(' ', |s| s.glyph());
    out.push_str(&format!(
        "{} [{}] ({}) {}\n",
        marker,
        task.status.glyph(),
        task.id,
        task.name
    ));

    let mut detail = Vec::new();
    if let Some(category) = &task.category {
        detail.push(format!("# {category}"));
    }
    if let Some(description) = &task.description {
        detail.push(description.clone());
    }
    if !detail.is_empty() {
        out.push_str(&format!("    {}\n", detail.join(" | ")));
    }

    let mut schedule = Vec::new();
    if let Some(do_date) = task.do_date {
        schedule.push(do_date.to_string());
    }
    if let Some(due_date) = task.due_date {
        schedule.push(format!("〆 {due_date}"));
    }
    schedule.push(format!(
        "{} // {}",
        format_duration(task.real_duration),
        format_duration(task.estimated_duration)
    ));
    out.push_str(&format!("    {}\n", schedule.join(" | ")));

    out.push_str(&"-".repeat(RULE_WIDTH));
    out
}
