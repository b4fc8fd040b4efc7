//! Layout command: prints the tracks computed for a snapshot.
//!
//! Output is grouped by resource, then by day, with each event shown as
//! `[track] id` in lane order. `--json` prints the raw slot map instead.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lanes_core::EventId;

use crate::layout::{LayoutReport, build_report};
use crate::{Config, ViewArgs, snapshot};

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Snapshot file with `events` and `resources` arrays.
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &LayoutArgs, config: &Config) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot, &config.fields)?;
    let report = build_report(
        &snapshot,
        &config.fields,
        config.zone()?,
        args.view.window(),
        None,
    );
    write_report(writer, &report, args.json)
}

/// Writes a report in the requested format.
pub fn write_report<W: Write>(writer: &mut W, report: &LayoutReport, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", format_layout_json(report)?)?;
    } else {
        write!(writer, "{}", format_layout(report))?;
    }
    Ok(())
}

/// Formats the human-readable layout.
pub fn format_layout(report: &LayoutReport) -> String {
    let mut output = String::new();

    writeln!(output, "LAYOUT ({})", report.timezone).unwrap();
    if let Some(window) = &report.window {
        writeln!(output, "Window: {} to {}", window.first(), window.last()).unwrap();
    }

    if report.slots.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No events laid out.").unwrap();
    }

    for (resource, days) in report.slots.iter() {
        writeln!(output).unwrap();
        match report.resource_names.get(resource) {
            Some(name) => writeln!(output, "{resource} ({name})").unwrap(),
            None => writeln!(output, "{resource}").unwrap(),
        }

        for (day, tracks) in days {
            // Lane order, then id for patched duplicates
            let mut placed: Vec<_> = tracks.iter().collect();
            placed.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
            let cells: Vec<String> = placed
                .iter()
                .map(|(event, track)| format!("[{track}] {event}"))
                .collect();
            writeln!(output, "  {day}  {}", cells.join("  ")).unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "Events: {}", report.event_count).unwrap();
    if !report.unplaced.is_empty() {
        let ids: Vec<&str> = report.unplaced.iter().map(EventId::as_str).collect();
        writeln!(output, "Unplaced: {}", ids.join(", ")).unwrap();
    }
    if report.skipped_records > 0 {
        writeln!(output, "Skipped records: {}", report.skipped_records).unwrap();
    }

    output
}

/// Formats the report as pretty JSON.
pub fn format_layout_json(report: &LayoutReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
