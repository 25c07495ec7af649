//! Toggle-state resolution for a single activity type.
//!
//! A toggle type alternates between its start and end actions:
//!
//! | last activity      | next action | label         |
//! |--------------------|-------------|---------------|
//! | none               | start       | `start_label` |
//! | status `start`     | end         | `end_label`   |
//! | any other status   | start       | `start_label` |
//!
//! Non-toggle types always resolve to [`MenuStatus::None`] under their own name.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::elapsed::{NOT_AVAILABLE, format_elapsed};
use crate::types::{Activity, ActivityType, ActivityTypeId};

/// The action a menu item offers next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    /// Not a toggle type.
    None,
    /// The activity is idle; the next action starts it.
    Start,
    /// The activity is running; the next action ends it.
    End,
}

impl MenuStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for MenuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A display-ready menu entry for one activity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: String,
    pub id: ActivityTypeId,
    pub status: MenuStatus,
    /// Human-readable time since the last activity, or `"N/A"`.
    pub time_elapsed: String,
    pub description: String,
    /// Epoch milliseconds of the last activity, or `0` if never logged.
    pub last_logged: i64,
}

impl MenuItem {
    /// Whether this type has any logged activity with a known time.
    pub const fn was_logged(&self) -> bool {
        self.last_logged != 0
    }

    /// The default `"{name} ({elapsed})"` label.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.time_elapsed)
    }
}

/// Resolves the next menu action for `activity_type`.
///
/// Pure: the result depends only on the arguments.
pub fn resolve(
    activity_type: &ActivityType,
    last_activity: Option<&Activity>,
    now: DateTime<Utc>,
) -> MenuItem {
    let logged_at = last_activity.and_then(Activity::logged_at);
    let time_elapsed = logged_at.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |timestamp| format_elapsed(timestamp, now),
    );
    let last_logged = logged_at.unwrap_or(0);

    let (name, status, description) = match last_activity {
        _ if !activity_type.toggle => (
            activity_type.name.as_str(),
            MenuStatus::None,
            activity_type.description.as_deref(),
        ),
        None => (
            activity_type.start_label(),
            MenuStatus::Start,
            activity_type.description.as_deref(),
        ),
        Some(activity) if activity.is_start() => (
            activity_type.end_label(),
            MenuStatus::End,
            activity.description.as_deref(),
        ),
        Some(activity) => (
            activity_type.start_label(),
            MenuStatus::Start,
            activity.description.as_deref(),
        ),
    };

    MenuItem {
        name: name.to_string(),
        id: activity_type.id,
        status,
        time_elapsed,
        description: description.unwrap_or_default().to_string(),
        last_logged,
    }
}
