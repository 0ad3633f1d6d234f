//! Compute per-weekday free time from recurring busy periods.
//!
//! Each weekday collects its block-out rules and the recurring events live in
//! the current week-number, sorts and merges them, then takes the complement
//! against the full `[00:00, 24:00)` day. The result is seven independent lists
//! of sorted, disjoint free intervals.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::time::{Interval, TimeOfDay, Weekday};

/// Which days a block-out rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayFilter {
    All,
    On(Weekday),
}

impl DayFilter {
    /// Whether a rule with this filter applies on `day`.
    pub fn matches(self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::On(d) => d == day,
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::On(d) => write!(f, "{}", d),
        }
    }
}

impl FromStr for DayFilter {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(DayFilter::All)
        } else {
            s.parse().map(DayFilter::On)
        }
    }
}

impl TryFrom<String> for DayFilter {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DayFilter> for String {
    fn from(value: DayFilter) -> Self {
        value.to_string()
    }
}

/// A recurring unavailable period, every day or on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOutRule {
    pub from: TimeOfDay,
    pub to: TimeOfDay,
    #[serde(default = "all_days")]
    pub day: DayFilter,
}

fn all_days() -> DayFilter {
    DayFilter::All
}

impl BlockOutRule {
    /// Build a rule from raw strings, e.g. `("08:00", "10:00", "all")`.
    pub fn parse(from: &str, to: &str, day: &str) -> Result<Self> {
        let rule = BlockOutRule {
            from: from.parse()?,
            to: to.parse()?,
            day: day.parse()?,
        };
        rule.interval()?;
        Ok(rule)
    }

    /// The rule's time range, or `InvalidInput` if it does not start before it ends.
    pub fn interval(&self) -> Result<Interval> {
        Interval::new(self.from, self.to).map_err(|_| {
            PlannerError::InvalidInput(format!(
                "block-out rule {}-{} ({}) must start before it ends",
                self.from, self.to, self.day
            ))
        })
    }
}

/// A timetabled commitment on one weekday, live only in some week-numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringEvent {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub weekday: Weekday,
    pub active_weeks: BTreeSet<u32>,
}

impl RecurringEvent {
    /// The event's time range, or `InvalidInput` if it does not start before it ends.
    pub fn interval(&self) -> Result<Interval> {
        Interval::new(self.start_time, self.end_time).map_err(|_| {
            PlannerError::InvalidInput(format!(
                "recurring event {}-{} on {} must start before it ends",
                self.start_time, self.end_time, self.weekday
            ))
        })
    }

    /// Whether the event is live in `week_number`.
    pub fn is_active(&self, week_number: u32) -> bool {
        self.active_weeks.contains(&week_number)
    }

    fn validate(&self) -> Result<Interval> {
        if self.active_weeks.contains(&0) {
            return Err(PlannerError::InvalidInput(format!(
                "recurring event {}-{} on {}: week numbers start at 1",
                self.start_time, self.end_time, self.weekday
            )));
        }
        self.interval()
    }
}

/// A free stretch of one weekday. Built only inside the crate, always non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeInterval {
    pub(crate) weekday: Weekday,
    pub(crate) from: TimeOfDay,
    pub(crate) to: TimeOfDay,
}

impl FreeInterval {
    fn new(weekday: Weekday, interval: Interval) -> Self {
        FreeInterval {
            weekday,
            from: interval.from,
            to: interval.to,
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn from(&self) -> TimeOfDay {
        self.from
    }

    pub fn to(&self) -> TimeOfDay {
        self.to
    }

    /// The same range without its weekday.
    pub fn interval(&self) -> Interval {
        Interval {
            from: self.from,
            to: self.to,
        }
    }

    /// Length in minutes.
    pub fn minutes(&self) -> u16 {
        self.interval().minutes()
    }
}

/// Free intervals for each of the seven weekdays.
///
/// Lists produced by [`compute_free_times`] are sorted, disjoint, and exactly
/// complement that day's busy periods. [`WeeklyFreeTime::from_intervals`]
/// accepts any validated intervals and only sorts them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeeklyFreeTime {
    days: [Vec<FreeInterval>; 7],
}

impl WeeklyFreeTime {
    /// Build from hand-picked intervals. Every [`Interval`] is already known to
    /// start before it ends.
    pub fn from_intervals(intervals: impl IntoIterator<Item = (Weekday, Interval)>) -> Self {
        let mut week = WeeklyFreeTime::default();
        for (weekday, interval) in intervals {
            week.days[weekday.index()].push(FreeInterval::new(weekday, interval));
        }
        for day in &mut week.days {
            day.sort_by_key(|f| (f.from, f.to));
        }
        week
    }

    /// Free intervals of `weekday`, sorted by start.
    pub fn day(&self, weekday: Weekday) -> &[FreeInterval] {
        &self.days[weekday.index()]
    }

    /// Every weekday with its free intervals, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[FreeInterval])> {
        Weekday::all()
            .into_iter()
            .map(move |d| (d, self.days[d.index()].as_slice()))
    }

    /// Free minutes summed over the whole week.
    pub fn total_free_minutes(&self) -> u32 {
        self.days
            .iter()
            .flatten()
            .map(|f| u32::from(f.minutes()))
            .sum()
    }

    /// Per-weekday interval lists, indexed by [`Weekday::index`].
    pub(crate) fn interval_queues(&self) -> [Vec<Interval>; 7] {
        self.days
            .clone()
            .map(|day| day.iter().map(FreeInterval::interval).collect())
    }
}

impl Serialize for WeeklyFreeTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (weekday, intervals) in self.iter() {
            let ranges: Vec<Interval> = intervals.iter().map(FreeInterval::interval).collect();
            map.serialize_entry(weekday.name(), &ranges)?;
        }
        map.end()
    }
}

/// 1-based week-number of `now` relative to the semester anchor.
///
/// Returns `0` when `now` falls before the anchor date: the semester has not
/// started, so no recurring event is live.
pub fn week_number(anchor: NaiveDate, now: NaiveDateTime) -> u32 {
    let today = now.date();
    if today < anchor {
        return 0;
    }
    let days = (today - anchor).num_days();
    (days / 7) as u32 + 1
}

/// Merge overlapping or touching busy intervals.
///
/// Returns a sorted, non-overlapping list.
pub fn merge_busy_periods(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|iv| (iv.from, iv.to));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        if let Some(last) = merged.last_mut() {
            if iv.from <= last.to {
                last.to = last.to.max(iv.to);
                continue;
            }
        }
        merged.push(iv);
    }

    merged
}

/// Merged busy periods for each weekday in the week-number `now` falls in.
///
/// # Errors
/// Returns `PlannerError::InvalidInput` for the first rule or event whose start
/// is not before its end, or an event with a week-number of 0.
pub fn busy_periods(
    anchor: NaiveDate,
    rules: &[BlockOutRule],
    events: &[RecurringEvent],
    now: NaiveDateTime,
) -> Result<[Vec<Interval>; 7]> {
    let rule_intervals = rules
        .iter()
        .map(|r| r.interval().map(|iv| (r.day, iv)))
        .collect::<Result<Vec<_>>>()?;
    let event_intervals = events
        .iter()
        .map(|e| e.validate().map(|iv| (e, iv)))
        .collect::<Result<Vec<_>>>()?;

    let week = week_number(anchor, now);
    debug!(week, anchor = %anchor, "computing busy periods");

    Ok(Weekday::all().map(|day| {
        let busy: Vec<Interval> = rule_intervals
            .iter()
            .filter(|(filter, _)| filter.matches(day))
            .map(|(_, iv)| *iv)
            .chain(
                event_intervals
                    .iter()
                    .filter(|(e, _)| e.weekday == day && e.is_active(week))
                    .map(|(_, iv)| *iv),
            )
            .collect();
        merge_busy_periods(busy)
    }))
}

/// Free gaps of one day given its merged busy list. Zero-length gaps are dropped.
fn complement(weekday: Weekday, merged: &[Interval]) -> Vec<FreeInterval> {
    let mut free = Vec::new();
    let mut cursor = TimeOfDay::MIDNIGHT;

    for busy in merged {
        if cursor < busy.from {
            free.push(FreeInterval {
                weekday,
                from: cursor,
                to: busy.from,
            });
        }
        cursor = cursor.max(busy.to);
    }

    if cursor < TimeOfDay::END_OF_DAY {
        free.push(FreeInterval {
            weekday,
            from: cursor,
            to: TimeOfDay::END_OF_DAY,
        });
    }

    free
}

/// Compute the free intervals of every weekday.
///
/// # Arguments
/// - `anchor` -- first day of week-number 1
/// - `rules` -- block-out rules, applied every week
/// - `events` -- recurring events, applied only in their active week-numbers
/// - `now` -- reference instant that selects the week-number
///
/// # Errors
/// Fails fast with `PlannerError::InvalidInput` if any rule or event is
/// malformed; a partial week would be meaningless.
pub fn compute_free_times(
    anchor: NaiveDate,
    rules: &[BlockOutRule],
    events: &[RecurringEvent],
    now: NaiveDateTime,
) -> Result<WeeklyFreeTime> {
    let busy = busy_periods(anchor, rules, events, now)?;

    let mut week = WeeklyFreeTime::default();
    for day in Weekday::all() {
        week.days[day.index()] = complement(day, &busy[day.index()]);
    }
    Ok(week)
}
