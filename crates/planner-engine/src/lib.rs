//! # planner-engine
//!
//! Deterministic weekly free-time computation and greedy task placement.
//!
//! The engine is a two-stage pipeline of pure functions. The free-time
//! calculator turns recurring busy periods (daily or per-weekday block-outs,
//! plus timetabled events that are only live in certain week-numbers) into
//! seven per-weekday lists of free intervals. The scheduler then walks a
//! rolling seven-day window from `now` and carves task work out of those
//! intervals, respecting deadlines and each task's minimum useful chunk.
//!
//! Neither stage reads a clock or touches storage: `now` is always an
//! argument, so identical inputs reproduce identical output.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use planner_engine::{compute_free_times, schedule_tasks, BlockOutRule, Importance, Task};
//!
//! let anchor = NaiveDate::from_ymd_opt(2026, 9, 6).unwrap();
//! let now = NaiveDate::from_ymd_opt(2026, 9, 14).unwrap().and_hms_opt(9, 10, 0).unwrap();
//! let rules = vec![BlockOutRule::parse("00:00", "08:00", "all").unwrap()];
//!
//! let free = compute_free_times(anchor, &rules, &[], now).unwrap();
//! let task = Task {
//!     id: "essay".into(),
//!     name: "Essay draft".into(),
//!     remaining_hours: 1.0,
//!     min_chunk_hours: 1.0,
//!     deadline: now + chrono::Duration::days(2),
//!     importance: Importance::High,
//!     group: "writing".into(),
//! };
//!
//! let schedule = schedule_tasks(&free, &[task], now);
//! assert_eq!(schedule.chunks.len(), 1);
//! assert_eq!(schedule.chunks[0].start_time.to_string(), "09:30");
//! ```
//!
//! ## Modules
//!
//! - [`time`] — `TimeOfDay`, `Weekday`, `Interval`, `Importance`
//! - [`freetime`] — recurring busy periods → per-weekday free intervals
//! - [`scheduler`] — greedy placement of tasks into free intervals
//! - [`priority`] — canonical task ordering (deadline, then importance)
//! - [`error`] — Error types

pub mod error;
pub mod freetime;
pub mod priority;
pub mod scheduler;
pub mod time;

pub use error::PlannerError;
pub use freetime::{
    compute_free_times, week_number, BlockOutRule, DayFilter, FreeInterval, RecurringEvent,
    WeeklyFreeTime,
};
pub use priority::prioritize;
pub use scheduler::{
    parse_deadline, schedule_tasks, Schedule, ScheduledChunk, Task, TaskOutcome, TaskStatus,
};
pub use time::{Importance, Interval, TimeOfDay, Weekday};
