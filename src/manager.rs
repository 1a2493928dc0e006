// Timer semantics layered on top of the store

use crate::clock::Clock;
use crate::models::{Status, TaskPatch};
use crate::render::{format_duration, format_time};
use crate::store::Store;
use chrono::NaiveDateTime;
use eyre::Result;
use tracing::debug;

/// Result of a start/pause/complete call.
///
/// Guard violations come back as values here rather than errors: the task
/// state is untouched and the CLI renders the message. Store writes only
/// happen after every guard has passed.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerOutcome {
    Started { id: i64, at: NaiveDateTime },
    Paused { id: i64, total_minutes: i64 },
    Completed { id: i64, total_minutes: i64 },
    /// Pause or start attempted on a completed task
    AlreadyComplete { id: i64 },
    /// Pause attempted without a running timer
    NotStarted { id: i64 },
    /// Complete attempted on a task whose timer never ran
    NeverStarted { id: i64 },
    NotFound { id: i64 },
}

impl std::fmt::Display for TimerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerOutcome::Started { id, at } => {
                write!(f, "Started task {} at {}.", id, format_time(Some(*at)))
            }
            TimerOutcome::Paused { id, total_minutes } => write!(
                f,
                "Task {} paused. Current duration: {}.",
                id,
                format_duration(Some(*total_minutes))
            ),
            TimerOutcome::Completed { id, total_minutes } => write!(
                f,
                "Task {} completed. Total duration: {}.",
                id,
                format_duration(Some(*total_minutes))
            ),
            TimerOutcome::AlreadyComplete { id } => write!(f, "Task {id} is already complete."),
            TimerOutcome::NotStarted { id } => write!(f, "Task {id} is not started."),
            TimerOutcome::NeverStarted { id } => write!(f, "Task {id} was never started."),
            TimerOutcome::NotFound { id } => write!(f, "Task {id} not found."),
        }
    }
}

/// Applies status transitions and accumulates real duration from timestamps.
///
/// Borrows the store for the duration of one logical command; the clock is
/// injected so elapsed-time arithmetic is testable.
pub struct TaskManager<'a> {
    store: &'a Store,
    clock: &'a dyn Clock,
}

impl<'a> TaskManager<'a> {
    pub fn new(store: &'a Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Start (or restart) the timer on a task.
    ///
    /// Allowed from any non-completed state. Restarting a task whose timer
    /// is already running first folds the elapsed minutes into
    /// `real_duration`, so no tracked time is ever discarded.
    pub fn start(&self, id: i64) -> Result<TimerOutcome> {
        let Some(task) = self.store.get(id)? else {
            return Ok(TimerOutcome::NotFound { id });
        };
        if task.is_completed() {
            return Ok(TimerOutcome::AlreadyComplete { id });
        }

        let now = self.clock.now();
        let mut patch = TaskPatch {
            start_time: Some(Some(now)),
            status: Some(Status::InProgress),
            ..TaskPatch::default()
        };
        if let Some(started_at) = task.start_time {
            let elapsed = elapsed_minutes(started_at, now);
            patch.real_duration = Some(task.real_duration.unwrap_or(0) + elapsed);
            debug!(id, elapsed, "Restart folded running timer into real duration");
        }

        self.store.update(id, &patch)?;
        Ok(TimerOutcome::Started { id, at: now })
    }

    /// Pause the timer, adding the elapsed whole minutes to `real_duration`
    pub fn pause(&self, id: i64) -> Result<TimerOutcome> {
        let Some(task) = self.store.get(id)? else {
            return Ok(TimerOutcome::NotFound { id });
        };
        if task.is_completed() {
            return Ok(TimerOutcome::AlreadyComplete { id });
        }
        let Some(started_at) = task.start_time else {
            return Ok(TimerOutcome::NotStarted { id });
        };

        let now = self.clock.now();
        let total = task.real_duration.unwrap_or(0) + elapsed_minutes(started_at, now);

        self.store.update(
            id,
            &TaskPatch {
                real_duration: Some(total),
                status: Some(Status::Paused),
                start_time: Some(None),
                ..TaskPatch::default()
            },
        )?;
        Ok(TimerOutcome::Paused {
            id,
            total_minutes: total,
        })
    }

    /// Stop the timer for good: accumulate elapsed minutes, stamp `end_time`
    /// and mark the task completed.
    ///
    /// Only a task with a running timer can be completed; a task that was
    /// never started is reported and left untouched.
    pub fn complete(&self, id: i64) -> Result<TimerOutcome> {
        let Some(task) = self.store.get(id)? else {
            return Ok(TimerOutcome::NotFound { id });
        };
        let Some(started_at) = task.start_time else {
            return Ok(TimerOutcome::NeverStarted { id });
        };

        let now = self.clock.now();
        let total = task.real_duration.unwrap_or(0) + elapsed_minutes(started_at, now);

        self.store.update(
            id,
            &TaskPatch {
                real_duration: Some(total),
                status: Some(Status::Completed),
                start_time: Some(None),
                end_time: Some(now),
                ..TaskPatch::default()
            },
        )?;
        Ok(TimerOutcome::Completed {
            id,
            total_minutes: total,
        })
    }
}

/// Whole minutes between two timestamps, fractional minutes truncated.
/// Never negative even if the clock hiccups backwards.
fn elapsed_minutes(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    ((to - from).num_seconds() / 60).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::TaskDraft;

    fn t0() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-15T09:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn setup(name: &str) -> (Store, ManualClock, i64) {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .create(&TaskDraft {
                name: name.to_string(),
                ..TaskDraft::default()
            })
            .unwrap();
        (store, ManualClock::at(t0()), id)
    }

    #[test]
    fn test_start_sets_timer_and_status() {
        let (store, clock, id) = setup("spin up");
        let manager = TaskManager::new(&store, &clock);

        let outcome = manager.start(id).unwrap();
        assert_eq!(outcome, TimerOutcome::Started { id, at: t0() });

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.start_time, Some(t0()));
        assert_eq!(task.real_duration, None);
    }

    #[test]
    fn test_pause_floors_elapsed_seconds() {
        let (store, clock, id) = setup("floor check");
        let manager = TaskManager::new(&store, &clock);

        manager.start(id).unwrap();
        clock.advance_secs(125); // 2 minutes 5 seconds
        let outcome = manager.pause(id).unwrap();
        assert_eq!(
            outcome,
            TimerOutcome::Paused {
                id,
                total_minutes: 2
            }
        );

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.status, Status::Paused);
        assert_eq!(task.real_duration, Some(2));
        assert_eq!(task.start_time, None);
    }

    #[test]
    fn test_duration_accumulates_across_cycles() {
        let (store, clock, id) = setup("two sittings");
        let manager = TaskManager::new(&store, &clock);

        manager.start(id).unwrap();
        clock.advance_secs(125);
        manager.pause(id).unwrap();

        manager.start(id).unwrap();
        clock.advance_secs(185); // 3 more whole minutes
        let outcome = manager.pause(id).unwrap();
        assert_eq!(
            outcome,
            TimerOutcome::Paused {
                id,
                total_minutes: 5
            }
        );
    }

    #[test]
    fn test_double_pause_is_idempotent() {
        let (store, clock, id) = setup("pause twice");
        let manager = TaskManager::new(&store, &clock);

        manager.start(id).unwrap();
        clock.advance_secs(120);
        manager.pause(id).unwrap();

        clock.advance_secs(600);
        let outcome = manager.pause(id).unwrap();
        assert_eq!(outcome, TimerOutcome::NotStarted { id });

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.real_duration, Some(2));
        assert_eq!(task.status, Status::Paused);
    }

    #[test]
    fn test_complete_requires_running_timer() {
        let (store, clock, id) = setup("never ran");
        let manager = TaskManager::new(&store, &clock);

        let outcome = manager.complete(id).unwrap();
        assert_eq!(outcome, TimerOutcome::NeverStarted { id });

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.status, Status::Incomplete);
        assert_eq!(task.end_time, None);
        assert_eq!(task.real_duration, None);
    }

    #[test]
    fn test_complete_accumulates_and_stamps_end_time() {
        let (store, clock, id) = setup("wrap up");
        let manager = TaskManager::new(&store, &clock);

        manager.start(id).unwrap();
        clock.advance_secs(125);
        manager.pause(id).unwrap();

        manager.start(id).unwrap();
        clock.advance_secs(185);
        let outcome = manager.complete(id).unwrap();
        assert_eq!(
            outcome,
            TimerOutcome::Completed {
                id,
                total_minutes: 5
            }
        );

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.status, Status::Completed);
        assert_eq!(task.start_time, None);
        assert_eq!(task.end_time, Some(clock.now()));
    }

    #[test]
    fn test_completed_task_rejects_start_and_pause() {
        let (store, clock, id) = setup("already done");
        let manager = TaskManager::new(&store, &clock);

        manager.start(id).unwrap();
        clock.advance_secs(60);
        manager.complete(id).unwrap();
        let before = store.get(id).unwrap().unwrap();

        clock.advance_secs(300);
        assert_eq!(
            manager.start(id).unwrap(),
            TimerOutcome::AlreadyComplete { id }
        );
        assert_eq!(
            manager.pause(id).unwrap(),
            TimerOutcome::AlreadyComplete { id }
        );
        assert_eq!(store.get(id).unwrap().unwrap(), before);
    }

    #[test]
    fn test_restart_folds_elapsed_time() {
        let (store, clock, id) = setup("restart");
        let manager = TaskManager::new(&store, &clock);

        manager.start(id).unwrap();
        clock.advance_secs(180);
        manager.start(id).unwrap();

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.real_duration, Some(3));
        assert_eq!(task.start_time, Some(clock.now()));
        assert_eq!(task.status, Status::InProgress);

        clock.advance_secs(60);
        let outcome = manager.pause(id).unwrap();
        assert_eq!(
            outcome,
            TimerOutcome::Paused {
                id,
                total_minutes: 4
            }
        );
    }

    #[test]
    fn test_unknown_id_is_reported() {
        let store = Store::open_in_memory().unwrap();
        let clock = ManualClock::at(t0());
        let manager = TaskManager::new(&store, &clock);

        assert_eq!(manager.start(7).unwrap(), TimerOutcome::NotFound { id: 7 });
        assert_eq!(manager.pause(7).unwrap(), TimerOutcome::NotFound { id: 7 });
        assert_eq!(
            manager.complete(7).unwrap(),
            TimerOutcome::NotFound { id: 7 }
        );
    }

    #[test]
    fn test_outcome_messages() {
        let outcome = TimerOutcome::Paused {
            id: 3,
            total_minutes: 125,
        };
        assert_eq!(
            outcome.to_string(),
            "Task 3 paused. Current duration: 02:05."
        );
        assert_eq!(
            TimerOutcome::NeverStarted { id: 9 }.to_string(),
            "Task 9 was never started."
        );
    }
}
