//! Drives the layout engine for one snapshot, the way the scheduler screen
//! does on every data change.

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};
use lanes_core::{
    Accessors, DateWindow, DayKey, EventId, FieldConfig, LayoutOptions, LayoutStore,
    RecomputeTrigger, ResourceKey, SlotMap, Track, resource,
};
use serde::Serialize;

use crate::config::Zone;
use crate::snapshot::Snapshot;

/// A single track override, as produced by a drag-and-drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    pub resource: ResourceKey,
    pub day: DayKey,
    pub event: EventId,
    pub track: Track,
}

/// Computed layout plus what is needed to print it.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    pub event_count: usize,
    pub skipped_records: usize,
    #[serde(skip)]
    pub resource_names: BTreeMap<ResourceKey, String>,
    pub unplaced: Vec<EventId>,
    pub slots: SlotMap,
}

/// Lays out a snapshot in the given zone, then applies an optional patch.
pub fn build_report(
    snapshot: &Snapshot,
    fields: &FieldConfig,
    zone: Zone,
    window: Option<DateWindow>,
    patch: Option<PatchRequest>,
) -> LayoutReport {
    match zone {
        Zone::Local => build_with(snapshot, fields, Local, zone.name(), window, patch),
        Zone::Fixed(offset) => build_with(snapshot, fields, offset, zone.name(), window, patch),
    }
}

fn build_with<Tz: TimeZone>(
    snapshot: &Snapshot,
    fields: &FieldConfig,
    tz: Tz,
    timezone: String,
    window: Option<DateWindow>,
    patch: Option<PatchRequest>,
) -> LayoutReport {
    let accessors = Accessors::standard();
    let mut store = LayoutStore::new(LayoutOptions {
        timezone: tz,
        window,
    });
    let mut trigger = RecomputeTrigger::new();
    trigger.observe(
        &mut store,
        &snapshot.events,
        &snapshot.resources,
        &accessors,
        fields,
    );

    if let Some(patch) = patch {
        store.patch_one(patch.resource, patch.day, patch.event, patch.track);
    }

    let unplaced = resource::unplaced(&snapshot.events, &snapshot.resources, &accessors)
        .into_iter()
        .map(|event| event.id.clone())
        .collect();

    let resource_names = snapshot
        .resources
        .iter()
        .filter_map(|r| {
            r.name
                .clone()
                .map(|name| (ResourceKey::Resource(r.id.clone()), name))
        })
        .collect();

    LayoutReport {
        timezone,
        window,
        event_count: snapshot.events.len(),
        skipped_records: snapshot.skipped,
        resource_names,
        unplaced,
        slots: store.slots().clone(),
    }
}
