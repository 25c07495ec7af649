//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A toggle activity type is missing one of its labels.
    #[error("toggle activity type is missing its {field}")]
    MissingLabel { field: &'static str },

    /// An update carried no fields to change.
    #[error("nothing to update: provide at least one field")]
    EmptyPatch,
}

/// Generates a database row ID newtype with common trait implementations.
macro_rules! define_row_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Returns the raw row ID.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_row_id!(
    /// Identifier of an activity type.
    ActivityTypeId
);

define_row_id!(
    /// Identifier of a single logged activity.
    ActivityId
);

/// A user-defined kind of activity.
///
/// Toggle types pair a start and an end action (e.g. "Start work" and
/// "End work"); non-toggle types are logged as single events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    pub id: ActivityTypeId,
    pub name: String,
    pub toggle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActivityType {
    /// Label shown when the next action is to start this activity.
    pub fn start_label(&self) -> &str {
        self.start_label.as_deref().unwrap_or(&self.name)
    }

    /// Label shown when the next action is to end this activity.
    pub fn end_label(&self) -> &str {
        self.end_label.as_deref().unwrap_or(&self.name)
    }
}

/// Fields for a new activity type, before it has an ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivityType {
    pub name: String,
    #[serde(default)]
    pub toggle: bool,
    #[serde(default)]
    pub start_label: Option<String>,
    #[serde(default)]
    pub end_label: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewActivityType {
    /// Checks that the name is present and toggle types carry both labels.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if self.toggle {
            if is_blank(self.start_label.as_deref()) {
                return Err(ValidationError::MissingLabel {
                    field: "start label",
                });
            }
            if is_blank(self.end_label.as_deref()) {
                return Err(ValidationError::MissingLabel { field: "end label" });
            }
        }
        Ok(())
    }
}

/// A partial update to an activity type. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityTypePatch {
    pub name: Option<String>,
    pub toggle: Option<bool>,
    pub start_label: Option<String>,
    pub end_label: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl ActivityTypePatch {
    /// Returns true if no field would change.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.toggle.is_none()
            && self.start_label.is_none()
            && self.end_label.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
    }

    /// Applies the patch on top of an existing type.
    pub fn apply(&self, original: &ActivityType) -> Result<ActivityType, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        Ok(ActivityType {
            id: original.id,
            name: self.name.clone().unwrap_or_else(|| original.name.clone()),
            toggle: self.toggle.unwrap_or(original.toggle),
            start_label: self
                .start_label
                .clone()
                .or_else(|| original.start_label.clone()),
            end_label: self.end_label.clone().or_else(|| original.end_label.clone()),
            category_id: self.category_id.or(original.category_id),
            description: self
                .description
                .clone()
                .or_else(|| original.description.clone()),
        })
    }
}

/// Status recorded on a logged activity.
///
/// Stored as free text, so values other than `start` and `end` are kept
/// verbatim in [`ActivityStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityStatus {
    Start,
    End,
    Other(String),
}

impl ActivityStatus {
    /// String representation for database storage.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for ActivityStatus {
    fn from(s: &str) -> Self {
        match s {
            "start" => Self::Start,
            "end" => Self::End,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ActivityStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ActivityStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// One logged event for an activity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub type_id: ActivityTypeId,
    /// Epoch milliseconds. Values `<= 0` mean the time is unknown.
    pub timestamp: i64,
    #[serde(default)]
    pub status: Option<ActivityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Activity {
    /// The timestamp, if one was recorded.
    pub const fn logged_at(&self) -> Option<i64> {
        if self.timestamp > 0 {
            Some(self.timestamp)
        } else {
            None
        }
    }

    /// True if this activity opened a toggle.
    pub const fn is_start(&self) -> bool {
        matches!(self.status, Some(ActivityStatus::Start))
    }
}

/// Fields for a new activity, before it has an ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub type_id: ActivityTypeId,
    pub timestamp: i64,
    pub status: Option<ActivityStatus>,
    pub description: Option<String>,
}

/// A partial update to a logged activity. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub timestamp: Option<i64>,
    pub status: Option<ActivityStatus>,
    pub description: Option<String>,
}

impl ActivityPatch {
    /// Returns true if no field would change.
    pub const fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.status.is_none() && self.description.is_none()
    }

    /// Applies the patch on top of an existing activity.
    pub fn apply(&self, original: &Activity) -> Result<Activity, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        Ok(Activity {
            id: original.id,
            type_id: original.type_id,
            timestamp: self.timestamp.unwrap_or(original.timestamp),
            status: self.status.clone().or_else(|| original.status.clone()),
            description: self
                .description
                .clone()
                .or_else(|| original.description.clone()),
        })
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
