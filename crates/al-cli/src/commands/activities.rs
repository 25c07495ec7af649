//! Logged activity commands.

use std::io::Write;

use al_core::{
    Activity, ActivityId, ActivityPatch, ActivityStatus, ActivityTypeId, NOT_AVAILABLE,
};
use al_db::Database;
use anyhow::{Context, Result};
use chrono::DateTime;

pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    type_id: ActivityTypeId,
    json: bool,
) -> Result<()> {
    let activities = db.list_activities_for_type(type_id)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &activities)?;
        writeln!(writer)?;
        return Ok(());
    }

    if activities.is_empty() {
        writeln!(writer, "No activities logged.")?;
        return Ok(());
    }
    for activity in &activities {
        writeln!(writer, "{}", summary(activity))?;
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, id: ActivityId) -> Result<()> {
    let activity = db
        .get_activity(id)?
        .with_context(|| format!("Activity with ID \"{id}\" not found"))?;
    serde_json::to_writer_pretty(&mut *writer, &activity)?;
    writeln!(writer)?;
    Ok(())
}

pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: ActivityId,
    patch: &ActivityPatch,
) -> Result<()> {
    let changes = db.update_activity(id, patch)?;
    writeln!(writer, "Updated {changes} activity(ies)")?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: ActivityId) -> Result<()> {
    let changes = db.delete_activity(id)?;
    writeln!(writer, "Deleted {changes} activity(ies)")?;
    Ok(())
}

/// One-line summary: `id  time  status  description`.
fn summary(activity: &Activity) -> String {
    let time = activity
        .logged_at()
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || NOT_AVAILABLE.to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
    let status = activity.status.as_ref().map_or("-", ActivityStatus::as_str);
    match &activity.description {
        Some(description) => format!("{:>4}  {time}  {status}  {description}", activity.id),
        None => format!("{:>4}  {time}  {status}", activity.id),
    }
}
