//! Log command: records an activity for a type.

use std::io::Write;

use al_core::{
    ActivityId, ActivityStatus, ActivityTypeId, MenuStatus, NewActivity, resolve,
};
use al_db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// What to record for a single `al log` invocation.
#[derive(Debug, Clone, Default)]
pub struct LogRequest {
    pub status: Option<String>,
    pub description: Option<String>,
    pub at: Option<i64>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    type_id: ActivityTypeId,
    request: LogRequest,
) -> Result<ActivityId> {
    run_at(writer, db, type_id, request, Utc::now())
}

/// Logs an activity, picking the status the menu would offer when none is given.
pub fn run_at<W: Write>(
    writer: &mut W,
    db: &mut Database,
    type_id: ActivityTypeId,
    request: LogRequest,
    now: DateTime<Utc>,
) -> Result<ActivityId> {
    let activity_type = db
        .get_activity_type(type_id)?
        .with_context(|| format!("Activity type with ID \"{type_id}\" not found"))?;
    let next = resolve(&activity_type, db.last_activity(type_id)?.as_ref(), now);

    let status = match request.status {
        Some(status) => Some(ActivityStatus::from(status)),
        None => match next.status {
            MenuStatus::Start => Some(ActivityStatus::Start),
            MenuStatus::End => Some(ActivityStatus::End),
            MenuStatus::None => None,
        },
    };
    let label = match status {
        Some(ActivityStatus::Start) => activity_type.start_label(),
        Some(ActivityStatus::End) => activity_type.end_label(),
        _ => activity_type.name.as_str(),
    }
    .to_string();

    let id = db.log_activity(&NewActivity {
        type_id,
        timestamp: request.at.unwrap_or_else(|| now.timestamp_millis()),
        status,
        description: request.description,
    })?;

    writeln!(writer, "Logged \"{label}\" (activity {id})")?;
    Ok(id)
}
