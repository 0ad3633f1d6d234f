//! Greedy placement of tasks into weekly free time.
//!
//! Tasks are taken in the order given (the caller's priority order, see
//! [`crate::priority`]). For each task the scheduler walks a rolling seven-day
//! window starting at `now`, rounds every candidate start up to the next half
//! hour, and carves chunks out of the free intervals until the task's
//! remaining work is placed, its deadline is reached, or the window runs out.
//! Capacity consumed by one task is gone for every task after it.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::freetime::WeeklyFreeTime;
use crate::time::{minute_of_day_ceil, round_up_to_half_hour, Importance, Interval, TimeOfDay, Weekday};

/// Length of the rolling window, in days, starting with today.
pub const WINDOW_DAYS: usize = 7;

// Slack for hour values such as 0.7 that are not exact in binary.
const MINUTE_EPSILON: f64 = 1e-6;

/// A pending piece of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Work still to do, in hours.
    pub remaining_hours: f64,
    /// Smallest chunk worth scheduling, in hours.
    pub min_chunk_hours: f64,
    pub deadline: NaiveDateTime,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub group: String,
}

impl Task {
    /// # Errors
    /// Returns `PlannerError::InvalidTask` for a negative or non-finite
    /// remaining duration, or a minimum chunk that is not strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !self.remaining_hours.is_finite() || self.remaining_hours < 0.0 {
            return Err(PlannerError::invalid_task(
                &self.id,
                format!(
                    "remaining duration must be a non-negative number of hours, got {}",
                    self.remaining_hours
                ),
            ));
        }
        if !self.min_chunk_hours.is_finite() || self.min_chunk_hours <= 0.0 {
            return Err(PlannerError::invalid_task(
                &self.id,
                format!(
                    "minimum chunk must be a positive number of hours, got {}",
                    self.min_chunk_hours
                ),
            ));
        }
        Ok(())
    }

    // Rounded down, so the placed total can never exceed the request.
    fn remaining_minutes(&self) -> i64 {
        (self.remaining_hours * 60.0 + MINUTE_EPSILON).floor() as i64
    }

    // Rounded up, so no chunk is ever shorter than asked for.
    fn min_chunk_minutes(&self) -> i64 {
        ((self.min_chunk_hours * 60.0 - MINUTE_EPSILON).ceil() as i64).max(1)
    }
}

/// Parse a task deadline as supplied by a task store.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]`, the same with a space separator, or an
/// RFC 3339 timestamp (whose offset is dropped, keeping wall-clock time).
///
/// # Errors
/// Returns `PlannerError::InvalidTask` naming `task_id` when nothing matches.
pub fn parse_deadline(task_id: &str, raw: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| PlannerError::invalid_task(task_id, format!("unparseable deadline '{}'", raw)))
}

/// A contiguous slice of one task placed inside one free interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledChunk {
    pub task_id: String,
    pub weekday: Weekday,
    /// Calendar date of `weekday` within the window.
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl ScheduledChunk {
    pub fn minutes(&self) -> u16 {
        self.end_time.minutes() - self.start_time.minutes()
    }

    pub fn hours(&self) -> f64 {
        f64::from(self.minutes()) / 60.0
    }

    pub fn start_at(&self) -> NaiveDateTime {
        at_minute(self.date, self.start_time.minutes())
    }

    pub fn end_at(&self) -> NaiveDateTime {
        at_minute(self.date, self.end_time.minutes())
    }
}

/// Why the scheduler stopped working on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// All remaining work was placed.
    FullyPlaced,
    /// The next usable start was at or past the deadline.
    DeadlineReached,
    /// The seven-day window had no more usable capacity.
    WindowExhausted,
}

/// Per-task summary of a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub requested_hours: f64,
    pub placed_hours: f64,
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn unplaced_hours(&self) -> f64 {
        (self.requested_hours - self.placed_hours).max(0.0)
    }
}

/// Result of [`schedule_tasks`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schedule {
    /// Placed chunks, in the order they were produced.
    pub chunks: Vec<ScheduledChunk>,
    /// One entry per accepted task, in input order.
    pub outcomes: Vec<TaskOutcome>,
    /// Tasks refused by validation. The rest of the batch still ran.
    #[serde(serialize_with = "serialize_errors")]
    pub rejected: Vec<PlannerError>,
}

impl Schedule {
    pub fn chunks_for<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a ScheduledChunk> {
        self.chunks.iter().filter(move |c| c.task_id == task_id)
    }

    pub fn placed_hours(&self, task_id: &str) -> f64 {
        self.chunks_for(task_id).map(ScheduledChunk::hours).sum()
    }

    /// Outcomes for tasks that still have work left over.
    pub fn unscheduled(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != TaskStatus::FullyPlaced)
    }
}

fn serialize_errors<S: Serializer>(
    errors: &[PlannerError],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

fn at_minute(date: NaiveDate, minute: u16) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute))
}

/// Place `tasks`, in order, into the free intervals of the seven days
/// starting at `now`.
///
/// The chunk length at each step is the smallest of the task's remaining
/// work, the interval's usable length, and the task's minimum chunk. Pieces
/// carved back-to-back from the same interval for the same task are reported
/// as a single chunk. A task that cannot be fully placed is not an error: its
/// [`TaskOutcome`] records what was placed and why scheduling stopped.
pub fn schedule_tasks(free: &WeeklyFreeTime, tasks: &[Task], now: NaiveDateTime) -> Schedule {
    let mut queues = free.interval_queues();
    let mut schedule = Schedule::default();

    for task in tasks {
        if let Err(err) = task.validate() {
            warn!(task = %task.id, error = %err, "rejecting task");
            schedule.rejected.push(err);
            continue;
        }
        let outcome = place_task(task, &mut queues, now, &mut schedule.chunks);
        schedule.outcomes.push(outcome);
    }

    schedule
}

fn place_task(
    task: &Task,
    queues: &mut [Vec<Interval>; 7],
    now: NaiveDateTime,
    chunks: &mut Vec<ScheduledChunk>,
) -> TaskOutcome {
    let requested = task.remaining_minutes();
    let min_chunk = task.min_chunk_minutes();
    let mut remaining = requested;

    let today = now.date();
    let today_weekday = Weekday::of(today);
    let now_minute = minute_of_day_ceil(now.time());
    let mut status = TaskStatus::WindowExhausted;

    'window: for offset in 0..WINDOW_DAYS {
        if remaining <= 0 {
            break;
        }
        let Some(date) = today.checked_add_days(Days::new(offset as u64)) else {
            break;
        };
        let weekday = today_weekday.offset(offset);
        let queue = &mut queues[weekday.index()];

        let mut i = 0;
        // Chunk still open for extension by the next piece of the same interval.
        let mut open: Option<usize> = None;

        while i < queue.len() && remaining > 0 {
            let slot = queue[i];

            let mut start = slot.from.minutes();
            if offset == 0 {
                if slot.to.minutes() <= now_minute {
                    i += 1;
                    open = None;
                    continue;
                }
                start = start.max(now_minute);
            }

            let rounded = round_up_to_half_hour(start);
            let usable = i64::from(slot.to.minutes()) - i64::from(rounded);
            if usable <= 0 || usable < min_chunk {
                i += 1;
                open = None;
                continue;
            }

            let start_at = at_minute(date, rounded);
            if start_at >= task.deadline {
                debug!(task = %task.id, %start_at, deadline = %task.deadline, "deadline reached");
                status = TaskStatus::DeadlineReached;
                break 'window;
            }

            let length = remaining.min(usable).min(min_chunk);
            let end_at = (start_at + Duration::minutes(length)).min(task.deadline);
            let placed = (end_at - start_at).num_minutes();
            if placed < min_chunk {
                i += 1;
                open = None;
                continue;
            }

            let end_minute = rounded + placed as u16;
            match open {
                Some(idx) if chunks[idx].end_time.minutes() == rounded => {
                    chunks[idx].end_time = TimeOfDay(end_minute);
                }
                _ => {
                    chunks.push(ScheduledChunk {
                        task_id: task.id.clone(),
                        weekday,
                        date,
                        start_time: TimeOfDay(rounded),
                        end_time: TimeOfDay(end_minute),
                    });
                    open = Some(chunks.len() - 1);
                }
            }
            debug!(
                task = %task.id,
                %weekday,
                start = %TimeOfDay(rounded),
                end = %TimeOfDay(end_minute),
                "placed chunk"
            );

            if end_minute >= slot.to.minutes() {
                queue.remove(i);
                open = None;
            } else {
                queue[i].from = TimeOfDay(end_minute);
            }
            remaining -= placed;
        }
    }

    if remaining <= 0 {
        status = TaskStatus::FullyPlaced;
    }

    TaskOutcome {
        task_id: task.id.clone(),
        requested_hours: task.remaining_hours,
        placed_hours: (requested - remaining) as f64 / 60.0,
        status,
    }
}
