//! First-fit track assignment within one resource bucket.
//!
//! # Algorithm Summary
//!
//! 1. Events arrive sorted by start (stable, so ties keep input order)
//! 2. Each event is expanded to the local days it touches
//! 3. The event takes the lowest track that is free on *every* one of those
//!    days, and keeps it for its whole span
//!
//! The used-track bookkeeping lives only for one call, so buckets never see
//! each other's lanes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::TimeZone;

use crate::day::{
    DateWindow, DayKey, MAX_SPAN_DAYS, day_bounds, days_between, span_len, truncate_span,
};
use crate::event::Scheduled;
use crate::types::{EventId, Track};

/// Tracks for one bucket, keyed by day then event.
pub type DaySlots = BTreeMap<DayKey, BTreeMap<EventId, Track>>;

/// Sorts events by ascending start. Stable: equal starts keep input order.
pub fn sort_by_start<E: Scheduled>(events: &mut [&E]) {
    events.sort_by_key(|event| event.span().0);
}

/// Assigns a track to every event of one bucket.
///
/// `events` must already be sorted with [`sort_by_start`]. When a window is
/// given only the days inside it are laid out; an event with no day in the
/// window gets no track. A repeated event id keeps its first placement in
/// the window. Spans longer than [`MAX_SPAN_DAYS`] are cut to that length.
pub fn assign_tracks<E, Tz>(events: &[&E], tz: &Tz, window: Option<&DateWindow>) -> DaySlots
where
    E: Scheduled,
    Tz: TimeZone,
{
    let mut used: HashMap<DayKey, BTreeSet<Track>> = HashMap::new();
    let mut placed: HashSet<&EventId> = HashSet::with_capacity(events.len());
    let mut slots = DaySlots::new();

    for event in events {
        let (start, end) = event.span();
        let (mut first, mut last) = day_bounds(start, end, tz);
        if let Some(window) = window {
            let Some(clamped) = window.clamp(first, last) else {
                continue;
            };
            (first, last) = clamped;
        }

        if !placed.insert(event.id()) {
            tracing::warn!(event_id = %event.id(), "skipping duplicate event in bucket");
            continue;
        }

        if span_len(first, last) > i64::from(MAX_SPAN_DAYS) {
            tracing::warn!(
                event_id = %event.id(),
                span_days = span_len(first, last),
                max_days = MAX_SPAN_DAYS,
                "truncating oversized event span"
            );
            last = truncate_span(first, last, MAX_SPAN_DAYS);
        }
        let days = days_between(first, last);

        let track = first_free(&used, &days);
        for day in days {
            used.entry(day).or_default().insert(track);
            slots
                .entry(day)
                .or_default()
                .insert(event.id().clone(), track);
        }
    }

    slots
}

/// Lowest track not taken on any of `days`.
fn first_free(used: &HashMap<DayKey, BTreeSet<Track>>, days: &[DayKey]) -> Track {
    let mut candidate = Track::FIRST;
    while days
        .iter()
        .any(|day| used.get(day).is_some_and(|tracks| tracks.contains(&candidate)))
    {
        candidate = candidate.next();
    }
    candidate
}
