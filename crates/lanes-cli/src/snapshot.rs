//! Loading already-fetched events and resources from a JSON snapshot.
//!
//! The snapshot mirrors what the scheduler screen receives from the API:
//! `{"events": [...], "resources": [...]}`. Records are read through the
//! configured attribute names; malformed ones are skipped, not fatal.

use std::path::Path;

use anyhow::{Context, Result};
use lanes_core::{Event, FieldConfig, Resource};
use serde::Deserialize;
use serde_json::Value;

/// Typed contents of a snapshot file.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub resources: Vec<Resource>,
    /// Records that could not be read.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    events: Vec<Value>,
    #[serde(default)]
    resources: Vec<Value>,
}

/// Reads and parses a snapshot file.
pub fn load(path: &Path, fields: &FieldConfig) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    parse(&text, fields).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Parses snapshot JSON, skipping records that cannot be read.
pub fn parse(text: &str, fields: &FieldConfig) -> Result<Snapshot> {
    let raw: RawSnapshot = serde_json::from_str(text).context("snapshot is not valid JSON")?;
    let mut skipped = 0;

    let events = raw
        .events
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match Event::from_record(record, fields) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed event");
                skipped += 1;
                None
            }
        })
        .collect::<Vec<_>>();

    let resources = raw
        .resources
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match Resource::from_record(record, fields) {
            Ok(resource) => Some(resource),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed resource");
                skipped += 1;
                None
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        event_count = events.len(),
        resource_count = resources.len(),
        skipped,
        "parsed snapshot"
    );

    Ok(Snapshot {
        events,
        resources,
        skipped,
    })
}
