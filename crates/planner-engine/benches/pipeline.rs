//! Benchmarks for the free-time calculator and the scheduler over a busy
//! student week.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};
use planner_engine::{
    compute_free_times, schedule_tasks, BlockOutRule, Importance, RecurringEvent, Task, Weekday,
};
use std::hint::black_box;

fn week_inputs() -> (Vec<BlockOutRule>, Vec<RecurringEvent>) {
    let rules = vec![
        BlockOutRule::parse("00:00", "07:30", "all").unwrap(),
        BlockOutRule::parse("23:00", "24:00", "all").unwrap(),
        BlockOutRule::parse("12:00", "13:00", "all").unwrap(),
        BlockOutRule::parse("18:00", "21:00", "friday").unwrap(),
    ];
    let weeks: BTreeSet<u32> = (1..=13).collect();
    let events = (1..6)
        .flat_map(|d| {
            let weekday = Weekday::from_index(d);
            [("09:00", "10:50"), ("14:00", "15:50")]
                .into_iter()
                .map(move |(s, e)| (weekday, s, e))
        })
        .map(|(weekday, start, end)| RecurringEvent {
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            weekday,
            active_weeks: weeks.clone(),
        })
        .collect();
    (rules, events)
}

fn bench_pipeline(c: &mut Criterion) {
    let anchor = NaiveDate::from_ymd_opt(2026, 9, 6).unwrap();
    let now = NaiveDate::from_ymd_opt(2026, 9, 14)
        .unwrap()
        .and_hms_opt(8, 15, 0)
        .unwrap();
    let (rules, events) = week_inputs();
    let tasks: Vec<Task> = (0..20)
        .map(|i| Task {
            id: format!("t{}", i),
            name: format!("task {}", i),
            remaining_hours: 1.0 + f64::from(i % 4),
            min_chunk_hours: 0.5 + f64::from(i % 3) * 0.5,
            deadline: now + Duration::hours(12 + 6 * i64::from(i)),
            importance: Importance::Normal,
            group: String::new(),
        })
        .collect();

    c.bench_function("compute_free_times", |b| {
        b.iter(|| compute_free_times(black_box(anchor), &rules, &events, black_box(now)))
    });

    let free = compute_free_times(anchor, &rules, &events, now).unwrap();
    c.bench_function("schedule_tasks_20", |b| {
        b.iter(|| schedule_tasks(black_box(&free), &tasks, black_box(now)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
