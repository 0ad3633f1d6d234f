//! Tests for canonical task ordering.

use chrono::{NaiveDate, NaiveDateTime};
use planner_engine::priority::compare_priority;
use planner_engine::{prioritize, Importance, Task};
use std::cmp::Ordering;

fn due(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn task(id: &str, deadline: NaiveDateTime, importance: Importance) -> Task {
    Task {
        id: id.to_string(),
        name: id.to_string(),
        remaining_hours: 1.0,
        min_chunk_hours: 1.0,
        deadline,
        importance,
        group: String::new(),
    }
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn earliest_deadline_goes_first() {
    let mut tasks = vec![
        task("friday", due(18, 12), Importance::Urgent),
        task("tuesday", due(15, 12), Importance::Low),
        task("wednesday", due(16, 9), Importance::Normal),
    ];

    prioritize(&mut tasks);

    assert_eq!(ids(&tasks), vec!["tuesday", "wednesday", "friday"]);
}

#[test]
fn equal_deadlines_order_by_descending_importance() {
    let deadline = due(15, 12);
    let mut tasks = vec![
        task("low", deadline, Importance::Low),
        task("urgent", deadline, Importance::Urgent),
        task("normal", deadline, Importance::Normal),
        task("high", deadline, Importance::High),
    ];

    prioritize(&mut tasks);

    assert_eq!(ids(&tasks), vec!["urgent", "high", "normal", "low"]);
}

#[test]
fn full_ties_keep_input_order() {
    let deadline = due(15, 12);
    let mut tasks = vec![
        task("b", deadline, Importance::High),
        task("a", deadline, Importance::High),
        task("c", deadline, Importance::High),
    ];

    prioritize(&mut tasks);

    assert_eq!(ids(&tasks), vec!["b", "a", "c"]);
}

#[test]
fn comparator_is_deadline_major() {
    let soon_low = task("soon", due(15, 9), Importance::Low);
    let later_urgent = task("later", due(15, 10), Importance::Urgent);

    assert_eq!(compare_priority(&soon_low, &later_urgent), Ordering::Less);
    assert_eq!(compare_priority(&later_urgent, &soon_low), Ordering::Greater);
}
