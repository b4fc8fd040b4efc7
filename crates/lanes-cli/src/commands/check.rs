//! Check command: verifies the layout invariants for a snapshot.
//!
//! A fresh layout always passes. Pass a track override with the `--patch-*`
//! flags to check a drag-and-drop before it is applied.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use lanes_core::{DayKey, EventId, ResourceKey, Track};

use crate::layout::{LayoutReport, PatchRequest, build_report};
use crate::{Config, ViewArgs, snapshot};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Snapshot file with `events` and `resources` arrays.
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Resource row of a track override to check.
    #[arg(long, requires_all = ["patch_day", "patch_event", "patch_track"])]
    pub patch_resource: Option<String>,

    /// Day of the override (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", requires = "patch_resource")]
    pub patch_day: Option<DayKey>,

    /// Event the override moves.
    #[arg(long, requires = "patch_resource")]
    pub patch_event: Option<String>,

    /// Track the override places the event on.
    #[arg(long, requires = "patch_resource")]
    pub patch_track: Option<u32>,
}

impl CheckArgs {
    fn request(&self) -> Result<Option<PatchRequest>> {
        let (Some(resource), Some(day), Some(event), Some(track)) = (
            &self.patch_resource,
            self.patch_day,
            &self.patch_event,
            self.patch_track,
        ) else {
            return Ok(None);
        };

        let resource = ResourceKey::parse(resource).context("--patch-resource cannot be empty")?;
        let event = EventId::new(event.as_str()).context("invalid --patch-event")?;
        Ok(Some(PatchRequest {
            resource,
            day,
            event,
            track: Track::new(track),
        }))
    }
}

pub fn run<W: Write>(writer: &mut W, args: &CheckArgs, config: &Config) -> Result<()> {
    let request = args.request()?;
    let snapshot = snapshot::load(&args.snapshot, &config.fields)?;
    let report = build_report(
        &snapshot,
        &config.fields,
        config.zone()?,
        args.view.window(),
        request,
    );
    verify(writer, &report)
}

/// Prints a summary and fails if any track is shared or any span is split.
pub fn verify<W: Write>(writer: &mut W, report: &LayoutReport) -> Result<()> {
    let resource_count = report.slots.resources().count();
    let day_count: usize = report
        .slots
        .iter()
        .map(|(_, days)| days.len())
        .sum();
    let placed_count = report.slots.placed_events().len();

    writeln!(
        writer,
        "Checked {resource_count} resource(s), {day_count} resource-day(s), {placed_count} placed event(s)."
    )?;
    if !report.unplaced.is_empty() {
        writeln!(writer, "Unplaced events: {}", report.unplaced.len())?;
    }

    let collisions = report.slots.collisions();
    for collision in &collisions {
        let events: Vec<&str> = collision.events.iter().map(EventId::as_str).collect();
        writeln!(
            writer,
            "Collision: {} {} track {}: {}",
            collision.resource,
            collision.day,
            collision.track,
            events.join(", ")
        )?;
    }

    let split = report.slots.split_spans();
    for (resource, event) in &split {
        writeln!(writer, "Split span: {resource} {event}")?;
    }

    if !collisions.is_empty() || !split.is_empty() {
        bail!(
            "layout invalid: {} collision(s), {} split span(s)",
            collisions.len(),
            split.len()
        );
    }

    writeln!(writer, "No collisions.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use lanes_core::FieldConfig;

    const SNAPSHOT: &str = r#"{
        "events": [
            {"id": "b-1", "start": "2025-03-03T09:00:00Z", "end": "2025-03-05T10:00:00Z", "resource_id": "van-1"},
            {"id": "b-2", "start": "2025-03-04T11:00:00Z", "end": "2025-03-04T12:00:00Z", "resource_id": "van-1"},
            {"id": "b-3", "start": "2025-03-04T11:00:00Z", "resource_id": "van-7"}
        ],
        "resources": [{"id": "van-1"}]
    }"#;

    fn report() -> LayoutReport {
        let fields = FieldConfig::default();
        let snapshot = snapshot::parse(SNAPSHOT, &fields).unwrap();
        build_report(&snapshot, &fields, "UTC".parse().unwrap(), None, None)
    }

    #[test]
    fn test_verify_clean_layout() {
        let mut output = Vec::new();
        verify(&mut output, &report()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Checked 1 resource(s), 3 resource-day(s), 2 placed event(s).
        Unplaced events: 1
        No collisions.
        ");
    }

    #[test]
    fn test_verify_reports_patched_collision() {
        let mut report = report();
        let van = ResourceKey::parse("van-1").unwrap();
        let day: DayKey = "2025-03-04".parse().unwrap();
        report
            .slots
            .insert(van, day, EventId::new("b-2").unwrap(), Track::new(0));

        let mut output = Vec::new();
        let err = verify(&mut output, &report).unwrap_err();
        assert_eq!(err.to_string(), "layout invalid: 1 collision(s), 0 split span(s)");

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Checked 1 resource(s), 3 resource-day(s), 2 placed event(s).
        Unplaced events: 1
        Collision: van-1 2025-03-04 track 0: b-1, b-2
        ");
    }

    #[test]
    fn test_verify_reports_split_span() {
        let mut report = report();
        let van = ResourceKey::parse("van-1").unwrap();
        let day: DayKey = "2025-03-05".parse().unwrap();
        report
            .slots
            .insert(van, day, EventId::new("b-1").unwrap(), Track::new(3));

        let mut output = Vec::new();
        let err = verify(&mut output, &report).unwrap_err();
        assert_eq!(err.to_string(), "layout invalid: 0 collision(s), 1 split span(s)");
        assert!(String::from_utf8(output).unwrap().contains("Split span: van-1 b-1"));
    }

    fn check_args(path: PathBuf) -> CheckArgs {
        CheckArgs {
            snapshot: path,
            view: ViewArgs::default(),
            patch_resource: None,
            patch_day: None,
            patch_event: None,
            patch_track: None,
        }
    }

    fn utc_config() -> Config {
        Config {
            timezone: "UTC".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_run_rejects_colliding_override() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let mut output = Vec::new();
        run(&mut output, &check_args(path.clone()), &utc_config()).unwrap();

        let args = CheckArgs {
            patch_resource: Some("van-1".to_string()),
            patch_day: Some("2025-03-04".parse().unwrap()),
            patch_event: Some("b-2".to_string()),
            patch_track: Some(0),
            ..check_args(path)
        };
        let mut output = Vec::new();
        let err = run(&mut output, &args, &utc_config()).unwrap_err();
        assert_eq!(err.to_string(), "layout invalid: 1 collision(s), 0 split span(s)");
    }

    #[test]
    fn test_run_accepts_free_override() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let args = CheckArgs {
            patch_resource: Some("van-1".to_string()),
            patch_day: Some("2025-03-04".parse().unwrap()),
            patch_event: Some("b-2".to_string()),
            patch_track: Some(2),
            ..check_args(path)
        };
        let mut output = Vec::new();
        run(&mut output, &args, &utc_config()).unwrap();
        assert!(String::from_utf8(output).unwrap().ends_with("No collisions.\n"));
    }
}
