//! CLI subcommand implementations.

pub mod activities;
pub mod log;
pub mod menu;
pub mod shows;
pub mod types;
