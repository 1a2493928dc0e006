// tasktrack - personal task tracking with timers, backed by a local SQLite table

pub mod clock;
pub mod manager;
pub mod models;
pub mod prompt;
pub mod render;
pub mod store;

// Re-export main types for convenience
pub use clock::{Clock, SystemClock};
pub use manager::{TaskManager, TimerOutcome};
pub use models::{Signifier, Status, Task, TaskDraft, TaskPatch};
pub use prompt::{EditInput, merge_edits};
pub use store::Store;
