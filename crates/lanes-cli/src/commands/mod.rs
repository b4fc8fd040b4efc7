//! CLI subcommand implementations.

pub mod check;
pub mod layout;
pub mod patch;
