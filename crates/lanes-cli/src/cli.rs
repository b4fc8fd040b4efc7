//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lanes_core::{DateWindow, DayKey};

use crate::commands::check::CheckArgs;
use crate::commands::layout::LayoutArgs;
use crate::commands::patch::PatchArgs;

/// Scheduler track layout.
///
/// Assigns every booking a lane so that bookings sharing a day on the same
/// vehicle never overlap on screen.
#[derive(Debug, Parser)]
#[command(name = "lanes", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lay out a snapshot and print each resource's tracks.
    Layout(LayoutArgs),

    /// Lay out a snapshot, then override one event's track.
    Patch(PatchArgs),

    /// Verify that a snapshot lays out without collisions.
    Check(CheckArgs),
}

/// Which grid is on screen. Without one, every day is laid out.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Lay out a single day (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", conflicts_with_all = ["week", "month"])]
    pub day: Option<DayKey>,

    /// Lay out the Monday-to-Sunday week containing DATE.
    #[arg(long, value_name = "DATE", conflicts_with = "month")]
    pub week: Option<DayKey>,

    /// Lay out the calendar month containing DATE.
    #[arg(long, value_name = "DATE")]
    pub month: Option<DayKey>,
}

impl ViewArgs {
    pub fn window(&self) -> Option<DateWindow> {
        self.day
            .map(|d| DateWindow::day(d.date()))
            .or_else(|| self.week.map(|d| DateWindow::week(d.date())))
            .or_else(|| self.month.map(|d| DateWindow::month(d.date())))
    }
}
