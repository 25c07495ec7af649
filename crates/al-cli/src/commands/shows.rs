//! TV show management commands.

use std::io::Write;

use al_db::{Database, DbError, TvShowProblem};
use anyhow::{Result, bail};

pub fn add<W: Write>(writer: &mut W, db: &mut Database, titles: &[String]) -> Result<Vec<i64>> {
    let ids = match db.add_tv_shows(titles) {
        Ok(ids) => ids,
        Err(DbError::TvShowBatch(issues)) => {
            for issue in &issues {
                let problem = match issue.problem {
                    TvShowProblem::MissingTitle => "missing title",
                    TvShowProblem::AlreadyExists => "already exists",
                };
                writeln!(writer, "{:?}: {problem}", issue.title)?;
            }
            bail!("{} TV show(s) could not be added", issues.len());
        }
        Err(err) => return Err(err.into()),
    };

    for (id, title) in ids.iter().zip(titles) {
        writeln!(writer, "Added {title} ({id})")?;
    }
    Ok(ids)
}

pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let shows = db.list_tv_shows()?;
    if shows.is_empty() {
        writeln!(writer, "No TV shows.")?;
    }
    for show in shows {
        writeln!(writer, "{:>4}  {}", show.id, show.title)?;
    }
    Ok(())
}

pub fn rename<W: Write>(writer: &mut W, db: &mut Database, id: i64, title: &str) -> Result<()> {
    db.rename_tv_show(id, title)?;
    writeln!(writer, "Renamed TV show {id} to {title}")?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: i64) -> Result<()> {
    db.delete_tv_show(id)?;
    writeln!(writer, "Deleted TV show {id}")?;
    Ok(())
}
