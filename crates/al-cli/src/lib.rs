//! Activity logger CLI library.
//!
//! This crate provides the CLI interface for the activity logger.

mod cli;
pub mod commands;
mod config;

pub use cli::{ActivitiesAction, Cli, Commands, ShowsAction, TypeFields, TypesAction};
pub use config::{Config, MenuLayout};
