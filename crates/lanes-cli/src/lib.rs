//! Scheduler layout CLI library.
//!
//! This crate stands in for the scheduler screen: it reads an already-fetched
//! snapshot of bookings and vehicles, runs the layout engine, and prints the
//! resulting tracks.

mod cli;
pub mod commands;
mod config;
pub mod layout;
pub mod snapshot;

pub use cli::{Cli, Commands, ViewArgs};
pub use config::{Config, Zone};
