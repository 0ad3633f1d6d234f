//! Canonical task ordering for the scheduler.
//!
//! The scheduler places tasks strictly in input order, so whoever builds the
//! task list decides who gets first pick of the free time. The usual order is
//! earliest deadline first, and among equal deadlines the more important task
//! first.

use std::cmp::Ordering;

use crate::scheduler::Task;

/// Compare two tasks by ascending deadline, then descending importance.
pub fn compare_priority(a: &Task, b: &Task) -> Ordering {
    a.deadline
        .cmp(&b.deadline)
        .then_with(|| b.importance.rank().cmp(&a.importance.rank()))
}

/// Sort tasks into scheduling order. Ties keep their original relative order.
pub fn prioritize(tasks: &mut [Task]) {
    tasks.sort_by(compare_priority);
}
