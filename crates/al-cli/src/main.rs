use std::io;
use std::path::Path;

use al_cli::commands::{activities, log, menu, shows, types};
use al_cli::{ActivitiesAction, Cli, Commands, Config, ShowsAction, TypesAction};
use al_core::{ActivityId, ActivityPatch, ActivityStatus, ActivityTypeId, ActivityTypePatch};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(al_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = al_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Menu { layout, json } => {
            menu::run(&mut out, &db, layout.unwrap_or(config.menu_layout), json)?;
        }
        Commands::Log {
            type_id,
            status,
            description,
            at,
        } => {
            let request = log::LogRequest {
                status,
                description,
                at,
            };
            log::run(&mut out, &mut db, ActivityTypeId::from(type_id), request)?;
        }
        Commands::Activities(action) => match action {
            ActivitiesAction::List { type_id, json } => {
                activities::list(&mut out, &db, ActivityTypeId::from(type_id), json)?;
            }
            ActivitiesAction::Show { id } => activities::show(&mut out, &db, ActivityId::from(id))?,
            ActivitiesAction::Edit {
                id,
                at,
                status,
                description,
            } => {
                let patch = ActivityPatch {
                    timestamp: at,
                    status: status.map(ActivityStatus::from),
                    description,
                };
                activities::edit(&mut out, &mut db, ActivityId::from(id), &patch)?;
            }
            ActivitiesAction::Rm { id } => {
                activities::remove(&mut out, &mut db, ActivityId::from(id))?;
            }
        },
        Commands::Types(action) => match action {
            TypesAction::Add(fields) => {
                types::add(&mut out, &mut db, fields)?;
            }
            TypesAction::List { json } => types::list(&mut out, &db, json)?,
            TypesAction::Show { id } => types::show(&mut out, &db, ActivityTypeId::from(id))?,
            TypesAction::Edit {
                id,
                name,
                toggle,
                start_label,
                end_label,
                category,
                description,
            } => {
                let patch = ActivityTypePatch {
                    name,
                    toggle,
                    start_label,
                    end_label,
                    category_id: category,
                    description,
                };
                types::edit(&mut out, &mut db, ActivityTypeId::from(id), &patch)?;
            }
            TypesAction::Rm { id } => types::remove(&mut out, &mut db, ActivityTypeId::from(id))?,
        },
        Commands::Shows(action) => match action {
            ShowsAction::Add { titles } => {
                shows::add(&mut out, &mut db, &titles)?;
            }
            ShowsAction::List => shows::list(&mut out, &db)?,
            ShowsAction::Rename { id, title } => shows::rename(&mut out, &mut db, id, &title)?,
            ShowsAction::Rm { id } => shows::remove(&mut out, &mut db, id)?,
        },
    }

    Ok(())
}
