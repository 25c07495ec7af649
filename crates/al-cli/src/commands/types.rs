//! Activity type management commands.

use std::io::Write;

use al_core::{ActivityType, ActivityTypeId, ActivityTypePatch, NewActivityType};
use al_db::Database;
use anyhow::{Context, Result};

use crate::TypeFields;

pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    fields: TypeFields,
) -> Result<ActivityTypeId> {
    let new_type = NewActivityType {
        name: fields.name,
        toggle: fields.toggle,
        start_label: fields.start_label,
        end_label: fields.end_label,
        category_id: fields.category,
        description: fields.description,
    };
    let id = db.create_activity_type(&new_type)?;
    writeln!(writer, "Created activity type {id}")?;
    Ok(id)
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let types = db.list_activity_types()?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &types)?;
        writeln!(writer)?;
        return Ok(());
    }

    if types.is_empty() {
        writeln!(writer, "No activity types defined.")?;
        return Ok(());
    }
    for activity_type in &types {
        writeln!(writer, "{}", summary(activity_type))?;
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, id: ActivityTypeId) -> Result<()> {
    let activity_type = db
        .get_activity_type(id)?
        .with_context(|| format!("Activity type with ID \"{id}\" not found"))?;
    serde_json::to_writer_pretty(&mut *writer, &activity_type)?;
    writeln!(writer)?;
    Ok(())
}

pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: ActivityTypeId,
    patch: &ActivityTypePatch,
) -> Result<()> {
    let changes = db.update_activity_type(id, patch)?;
    writeln!(writer, "Updated {changes} activity type(s)")?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: ActivityTypeId) -> Result<()> {
    let changes = db.delete_activity_type(id)?;
    writeln!(writer, "Deleted {changes} activity type(s)")?;
    Ok(())
}

/// One-line summary: `id  name  [start / end]`.
fn summary(activity_type: &ActivityType) -> String {
    if activity_type.toggle {
        format!(
            "{:>4}  {}  [{} / {}]",
            activity_type.id,
            activity_type.name,
            activity_type.start_label(),
            activity_type.end_label()
        )
    } else {
        format!("{:>4}  {}", activity_type.id, activity_type.name)
    }
}
