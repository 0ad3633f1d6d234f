//! Minute-granularity time-of-day model shared by the calculator and the scheduler.
//!
//! Everything here is calendar-agnostic: a `TimeOfDay` is minutes since midnight,
//! a `Weekday` is a position in a fixed seven-day cycle starting on Sunday. Only
//! [`Weekday::of`] and [`minute_of_day_ceil`] touch `chrono` types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Minutes in one day. Also the exclusive end of the last interval of a day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Granularity chunk starts are rounded up to.
pub const SLOT_GRANULARITY_MINUTES: u16 = 30;

/// Minutes since midnight.
///
/// Values `0..1440` name a minute within the day. `1440` (`"24:00"`) is also
/// accepted so that an interval can run to the end of the day; it never names
/// a start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(pub(crate) u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from a raw minute count, rejecting anything past `24:00`.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(PlannerError::InvalidInput(format!(
                "time of day out of range: {} minutes",
                minutes
            )));
        }
        Ok(TimeOfDay(minutes))
    }

    /// Build from an hour and minute. `24:00` is the only valid hour-24 value.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(PlannerError::InvalidInput(format!(
                "time of day out of range: {}:{:02}",
                hour, minute
            )));
        }
        Ok(TimeOfDay(hour * 60 + minute))
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component, `0..=24`.
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Minute component, `0..60`.
    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = PlannerError;

    /// Parse `"HH:MM"` (one or two hour digits, exactly two minute digits).
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || PlannerError::InvalidInput(format!("malformed time of day: '{}'", s));

        let (h, m) = s.trim().split_once(':').ok_or_else(malformed)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(malformed());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let hour: u16 = h.parse().map_err(|_| malformed())?;
        let minute: u16 = m.parse().map_err(|_| malformed())?;
        TimeOfDay::from_hm(hour, minute).map_err(|_| malformed())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Day within the repeating seven-day cycle. Index 0 is Sunday, which is also
/// the conventional first day of a week anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sunday,
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
];

impl Weekday {
    /// All seven days in index order, Sunday first.
    pub fn all() -> [Weekday; 7] {
        WEEKDAYS
    }

    /// Position in the cycle, Sunday = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at `index`, wrapping modulo 7.
    pub fn from_index(index: usize) -> Weekday {
        WEEKDAYS[index % 7]
    }

    /// The weekday a calendar date falls on.
    pub fn of(date: NaiveDate) -> Weekday {
        Weekday::from_index(date.weekday().num_days_from_sunday() as usize)
    }

    /// The day `days` after this one, wrapping around the week.
    pub fn offset(self, days: usize) -> Weekday {
        Weekday::from_index(self.index() + days)
    }

    /// Lowercase English name, as used in input and output files.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "sunday",
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        WEEKDAYS
            .iter()
            .copied()
            .find(|d| d.name() == lower || d.name()[..3] == lower)
            .ok_or_else(|| PlannerError::InvalidInput(format!("unknown weekday: '{}'", s)))
    }
}

impl TryFrom<String> for Weekday {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Weekday> for String {
    fn from(value: Weekday) -> Self {
        value.name().to_string()
    }
}

/// A half-open `[from, to)` stretch of one day. Always non-empty.
///
/// Only [`Interval::new`] builds one from outside the crate, so `from < to`
/// holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    pub(crate) from: TimeOfDay,
    pub(crate) to: TimeOfDay,
}

impl Interval {
    /// # Errors
    /// Returns `PlannerError::InvalidInput` unless `from` is strictly before `to`.
    pub fn new(from: TimeOfDay, to: TimeOfDay) -> Result<Self> {
        if from >= to {
            return Err(PlannerError::InvalidInput(format!(
                "interval must start before it ends: {}-{}",
                from, to
            )));
        }
        Ok(Interval { from, to })
    }

    pub fn from(&self) -> TimeOfDay {
        self.from
    }

    pub fn to(&self) -> TimeOfDay {
        self.to
    }

    pub fn minutes(&self) -> u16 {
        self.to.minutes() - self.from.minutes()
    }

    pub fn hours(&self) -> f64 {
        f64::from(self.minutes()) / 60.0
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.from <= other.from && other.to <= self.to
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// How much a task matters relative to others with the same deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Importance {
    /// Total ordering key; higher is more important.
    pub fn rank(self) -> u8 {
        match self {
            Importance::Low => 0,
            Importance::Normal => 1,
            Importance::High => 2,
            Importance::Urgent => 3,
        }
    }
}

impl Ord for Importance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Importance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Round a minute-of-day up to the next `:00` or `:30`. Values already on a
/// boundary are unchanged. The result may be `1440`.
pub fn round_up_to_half_hour(minutes: u16) -> u16 {
    minutes.div_ceil(SLOT_GRANULARITY_MINUTES) * SLOT_GRANULARITY_MINUTES
}

/// Minute-of-day for a wall-clock time, rounding any seconds up so the result
/// is never earlier than `time`.
pub fn minute_of_day_ceil(time: NaiveTime) -> u16 {
    let whole = time.hour() * 60 + time.minute();
    let partial = time.second() > 0 || time.nanosecond() > 0;
    (whole + u32::from(partial)) as u16
}
