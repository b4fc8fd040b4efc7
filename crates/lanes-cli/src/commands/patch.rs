//! Patch command: applies one drag-and-drop result on top of a fresh layout.
//!
//! The override is taken as given, exactly like the scheduler does after its
//! own collision checks; run `lanes check` afterwards to see the effect.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lanes_core::{DayKey, EventId, ResourceKey, Track};

use crate::commands::layout::write_report;
use crate::layout::{PatchRequest, build_report};
use crate::{Config, snapshot};

#[derive(Debug, Args)]
pub struct PatchArgs {
    /// Snapshot file with `events` and `resources` arrays.
    pub snapshot: PathBuf,

    /// Resource row to patch (`all` when no resources are configured).
    #[arg(long)]
    pub resource: String,

    /// Day to patch (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub day: DayKey,

    /// Event to move.
    #[arg(long)]
    pub event: String,

    /// Track to place the event on.
    #[arg(long)]
    pub track: u32,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PatchArgs {
    fn request(&self) -> Result<PatchRequest> {
        let resource = ResourceKey::parse(&self.resource).context("--resource cannot be empty")?;
        let event = EventId::new(self.event.as_str()).context("invalid --event")?;
        Ok(PatchRequest {
            resource,
            day: self.day,
            event,
            track: Track::new(self.track),
        })
    }
}

pub fn run<W: Write>(writer: &mut W, args: &PatchArgs, config: &Config) -> Result<()> {
    let request = args.request()?;
    let snapshot = snapshot::load(&args.snapshot, &config.fields)?;
    let report = build_report(&snapshot, &config.fields, config.zone()?, None, Some(request));
    write_report(writer, &report, args.json)
}
