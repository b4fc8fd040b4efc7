//! The computed `resource -> day -> event -> track` map.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::day::DayKey;
use crate::resource::ResourceKey;
use crate::track::DaySlots;
use crate::types::{EventId, Track};

/// Track positions for every bucket, ordered for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotMap {
    buckets: BTreeMap<ResourceKey, DaySlots>,
}

/// Two or more events sharing one track on the same resource and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub resource: ResourceKey,
    pub day: DayKey,
    pub track: Track,
    pub events: Vec<EventId>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The track of `event` on `resource` and `day`, if it was laid out there.
    pub fn track(&self, resource: &ResourceKey, day: DayKey, event: &EventId) -> Option<Track> {
        self.buckets.get(resource)?.get(&day)?.get(event).copied()
    }

    /// All placements of one bucket.
    pub fn bucket(&self, resource: &ResourceKey) -> Option<&DaySlots> {
        self.buckets.get(resource)
    }

    /// Event tracks on one resource and day.
    pub fn day(&self, resource: &ResourceKey, day: DayKey) -> Option<&BTreeMap<EventId, Track>> {
        self.buckets.get(resource)?.get(&day)
    }

    /// Number of lanes a renderer needs for one resource and day.
    pub fn lane_count(&self, resource: &ResourceKey, day: DayKey) -> u32 {
        self.day(resource, day)
            .and_then(|tracks| tracks.values().max())
            .map_or(0, |max| max.value() + 1)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceKey> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &DaySlots)> {
        self.buckets.iter()
    }

    /// Sets one placement, creating missing buckets. Returns the previous track.
    pub fn insert(
        &mut self,
        resource: ResourceKey,
        day: DayKey,
        event: EventId,
        track: Track,
    ) -> Option<Track> {
        self.buckets
            .entry(resource)
            .or_default()
            .entry(day)
            .or_default()
            .insert(event, track)
    }

    pub(crate) fn set_bucket(&mut self, resource: ResourceKey, slots: DaySlots) {
        if !slots.is_empty() {
            self.buckets.insert(resource, slots);
        }
    }

    /// Every track held by more than one event.
    ///
    /// A fresh layout never has any; patches are taken on trust and may
    /// introduce them.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut found = Vec::new();
        for (resource, days) in &self.buckets {
            for (day, tracks) in days {
                let mut by_track: BTreeMap<Track, Vec<EventId>> = BTreeMap::new();
                for (event, track) in tracks {
                    by_track.entry(*track).or_default().push(event.clone());
                }
                found.extend(
                    by_track
                        .into_iter()
                        .filter(|(_, events)| events.len() > 1)
                        .map(|(track, events)| Collision {
                            resource: resource.clone(),
                            day: *day,
                            track,
                            events,
                        }),
                );
            }
        }
        found
    }

    /// Events whose track changes from one day to another within a bucket.
    ///
    /// A recompute keeps every event on one track for its whole span; a
    /// patch that moves only one day of a multi-day event breaks that.
    pub fn split_spans(&self) -> Vec<(ResourceKey, EventId)> {
        let mut split = Vec::new();
        for (resource, days) in &self.buckets {
            let mut first_seen: BTreeMap<&EventId, Track> = BTreeMap::new();
            let mut broken: BTreeSet<&EventId> = BTreeSet::new();
            for tracks in days.values() {
                for (event, track) in tracks {
                    if *first_seen.entry(event).or_insert(*track) != *track {
                        broken.insert(event);
                    }
                }
            }
            split.extend(
                broken
                    .into_iter()
                    .map(|event| (resource.clone(), event.clone())),
            );
        }
        split
    }

    /// Distinct events placed anywhere in the map.
    pub fn placed_events(&self) -> BTreeSet<&EventId> {
        self.buckets
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::keys)
            .collect()
    }
}
