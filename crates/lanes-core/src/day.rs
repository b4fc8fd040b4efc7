//! Day expansion: which calendar days an event touches.
//!
//! Overlap is detected per local calendar day, not per hour. Two bookings on
//! the same vehicle and the same day compete for lanes even if their hours
//! do not intersect; hour-level stacking belongs to the renderer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A calendar date in the layout's time zone, formatted `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

/// Error returned when a day key string is not `YYYY-MM-DD`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid day key {input:?}, expected YYYY-MM-DD")]
pub struct DayKeyParseError {
    input: String,
}

impl DayKey {
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The local day an instant falls on.
    pub fn of<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> Self {
        Self(instant.with_timezone(tz).date_naive())
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = DayKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DayKeyParseError {
                input: s.to_string(),
            })
    }
}

impl Serialize for DayKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Longest span, in days, laid out for a single event.
///
/// Longer spans are almost always a mistyped year; they are truncated to
/// this many days from their first laid-out day.
pub const MAX_SPAN_DAYS: u32 = 366;

/// Every local day an event touches, in order, both ends inclusive.
///
/// An event ending exactly at local midnight still touches the day it ends
/// on. A malformed span (`end < start`) collapses to the single day of
/// `start`.
pub fn expand_days<Tz: TimeZone>(start: DateTime<Utc>, end: DateTime<Utc>, tz: &Tz) -> Vec<DayKey> {
    let (first, last) = day_bounds(start, end, tz);
    days_between(first, last)
}

/// First and last local day of a span, with `end < start` collapsed to `start`.
pub fn day_bounds<Tz: TimeZone>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
) -> (DayKey, DayKey) {
    let end = end.max(start);
    (DayKey::of(start, tz), DayKey::of(end, tz))
}

/// Number of days from `first` to `last`, both inclusive.
pub fn span_len(first: DayKey, last: DayKey) -> i64 {
    last.0.signed_duration_since(first.0).num_days() + 1
}

/// `last`, pulled in so the span starting at `first` is at most `max_days` long.
pub fn truncate_span(first: DayKey, last: DayKey, max_days: u32) -> DayKey {
    if span_len(first, last) <= i64::from(max_days) {
        return last;
    }
    first
        .0
        .checked_add_days(Days::new(u64::from(max_days.saturating_sub(1))))
        .map_or(last, DayKey)
}

/// The days from `first` to `last`, both inclusive.
pub fn days_between(first: DayKey, last: DayKey) -> Vec<DayKey> {
    first
        .0
        .iter_days()
        .take_while(|day| *day <= last.0)
        .map(DayKey)
        .collect()
}

/// An inclusive range of days, the visible part of a day/week/month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    first: DayKey,
    last: DayKey,
}

impl DateWindow {
    /// Creates a window; bounds given in the wrong order are swapped.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        let (first, last) = if last < first { (last, first) } else { (first, last) };
        Self {
            first: DayKey(first),
            last: DayKey(last),
        }
    }

    /// A single-day grid.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// The Monday-to-Sunday week containing `date`.
    pub fn week(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self::new(monday, monday + Duration::days(6))
    }

    /// The calendar month containing `date`.
    pub fn month(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self::new(first, last)
    }

    pub const fn first(&self) -> DayKey {
        self.first
    }

    pub const fn last(&self) -> DayKey {
        self.last
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.first <= day && day <= self.last
    }

    /// The part of `first..=last` inside the window, if any.
    pub fn clamp(&self, first: DayKey, last: DayKey) -> Option<(DayKey, DayKey)> {
        let first = first.max(self.first);
        let last = last.min(self.last);
        (first <= last).then_some((first, last))
    }
}
