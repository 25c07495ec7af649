//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::MenuLayout;

/// Activity logger.
///
/// Logs timestamped activities and shows a menu of what to do next.
#[derive(Debug, Parser)]
#[command(name = "al", version, about, long_about = None)]
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
    /// Show the menu of next actions.
    Menu {
        /// Menu layout (defaults to the configured layout).
        #[arg(long, value_enum)]
        layout: Option<MenuLayout>,

        /// Output the full menu as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Log an activity.
    Log {
        /// The activity type ID.
        type_id: i64,

        /// Status to record. Defaults to the next action the menu offers.
        #[arg(long)]
        status: Option<String>,

        /// Free-text description (e.g. "Game: Chess").
        #[arg(long, short)]
        description: Option<String>,

        /// Timestamp in epoch milliseconds. Defaults to now.
        #[arg(long)]
        at: Option<i64>,
    },

    /// Inspect and correct logged activities.
    #[command(subcommand)]
    Activities(ActivitiesAction),

    /// Manage activity types.
    #[command(subcommand)]
    Types(TypesAction),

    /// Manage TV shows.
    #[command(subcommand)]
    Shows(ShowsAction),
}

/// Logged activity subcommands.
#[derive(Debug, Subcommand)]
pub enum ActivitiesAction {
    /// List the activities of a type, newest first.
    List {
        type_id: i64,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one activity.
    Show { id: i64 },
    /// Change fields of a logged activity.
    Edit {
        id: i64,
        /// Timestamp in epoch milliseconds.
        #[arg(long)]
        at: Option<i64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Delete a logged activity.
    Rm { id: i64 },
}

/// Activity type subcommands.
#[derive(Debug, Subcommand)]
pub enum TypesAction {
    /// Create an activity type.
    Add(TypeFields),
    /// List activity types.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one activity type.
    Show { id: i64 },
    /// Change fields of an activity type.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        toggle: Option<bool>,
        #[arg(long)]
        start_label: Option<String>,
        #[arg(long)]
        end_label: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an activity type and its activities.
    Rm { id: i64 },
}

/// Fields for a new activity type.
#[derive(Debug, Args)]
pub struct TypeFields {
    #[arg(long)]
    pub name: String,

    /// Pair start and end actions for this type.
    #[arg(long)]
    pub toggle: bool,

    #[arg(long)]
    pub start_label: Option<String>,

    #[arg(long)]
    pub end_label: Option<String>,

    #[arg(long)]
    pub category: Option<i64>,

    #[arg(long)]
    pub description: Option<String>,
}

/// TV show subcommands.
#[derive(Debug, Subcommand)]
pub enum ShowsAction {
    /// Add one or more TV shows.
    Add {
        #[arg(required = true)]
        titles: Vec<String>,
    },
    /// List TV shows.
    List,
    /// Rename a TV show.
    Rename { id: i64, title: String },
    /// Delete a TV show.
    Rm { id: i64 },
}
