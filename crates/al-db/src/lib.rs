//! Storage layer for the activity logger.
//!
//! Provides persistence for activity types, logged activities and TV shows
//! using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared across them without
//! external synchronization. Menu derivation drives all lookups from a single
//! task, so this is enough for [`ActivitySource`].
//!
//! # Schema
//!
//! Timestamps are stored as INTEGER epoch milliseconds, matching the
//! [`Activity::timestamp`] field. Activity statuses are free TEXT so values
//! other than `start`/`end` survive a round trip.

use std::path::Path;

use al_core::{
    Activity, ActivityId, ActivityPatch, ActivitySource, ActivityStatus, ActivityType,
    ActivityTypeId, ActivityTypePatch, NewActivity, NewActivityType, ValidationError,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Input failed validation before reaching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The referenced row does not exist.
    #[error("{entity} with ID \"{id}\" not found")]
    NotFound { entity: &'static str, id: i64 },
    /// A TV show with this title already exists.
    #[error("TV show \"{0}\" already exists")]
    DuplicateTvShow(String),
    /// Some shows in a batch could not be added; nothing was inserted.
    #[error("{} TV show(s) could not be added", .0.len())]
    TvShowBatch(Vec<TvShowIssue>),
}

/// A stored TV show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvShow {
    pub id: i64,
    pub title: String,
}

/// Why a TV show in a batch was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvShowIssue {
    pub title: String,
    pub problem: TvShowProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvShowProblem {
    MissingTitle,
    AlreadyExists,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const ACTIVITY_TYPE_COLUMNS: &str =
    "id, name, toggle, start_label, end_label, category_id, description";

const ACTIVITY_COLUMNS: &str = "id, type_id, timestamp, status, description";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS activity_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                toggle INTEGER NOT NULL DEFAULT 0,
                start_label TEXT,
                end_label TEXT,
                category_id INTEGER,
                description TEXT
            );

            -- timestamp: epoch milliseconds
            -- status: 'start', 'end', NULL, or any other free text
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_id INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                status TEXT,
                description TEXT,
                FOREIGN KEY (type_id) REFERENCES activity_types(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_activities_type_timestamp
                ON activities(type_id, timestamp);

            CREATE TABLE IF NOT EXISTS tv_shows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE
            );
            ",
        )?;
        Ok(())
    }

    // ========== Activity types ==========

    /// Creates an activity type and returns its ID.
    pub fn create_activity_type(
        &mut self,
        new_type: &NewActivityType,
    ) -> Result<ActivityTypeId, DbError> {
        new_type.validate()?;
        let id = insert_activity_type(&self.conn, new_type)?;
        tracing::debug!(%id, name = %new_type.name, "created activity type");
        Ok(id)
    }

    /// Creates several activity types in one transaction.
    ///
    /// Either every type is created or none is.
    pub fn create_activity_types(
        &mut self,
        new_types: &[NewActivityType],
    ) -> Result<Vec<ActivityTypeId>, DbError> {
        for new_type in new_types {
            new_type.validate()?;
        }
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(new_types.len());
        for new_type in new_types {
            ids.push(insert_activity_type(&tx, new_type)?);
        }
        tx.commit()?;
        tracing::debug!(count = ids.len(), "created activity types");
        Ok(ids)
    }

    /// Lists all activity types ordered by ID.
    pub fn list_activity_types(&self) -> Result<Vec<ActivityType>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_TYPE_COLUMNS} FROM activity_types ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], activity_type_from_row)?;
        let mut types = Vec::new();
        for row in rows {
            types.push(row?);
        }
        Ok(types)
    }

    /// Gets a single activity type.
    pub fn get_activity_type(&self, id: ActivityTypeId) -> Result<Option<ActivityType>, DbError> {
        let activity_type = self
            .conn
            .query_row(
                &format!("SELECT {ACTIVITY_TYPE_COLUMNS} FROM activity_types WHERE id = ?"),
                [id.get()],
                activity_type_from_row,
            )
            .optional()?;
        Ok(activity_type)
    }

    /// Applies a partial update and returns the number of changed rows.
    pub fn update_activity_type(
        &mut self,
        id: ActivityTypeId,
        patch: &ActivityTypePatch,
    ) -> Result<usize, DbError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }
        let original = self
            .get_activity_type(id)?
            .ok_or(DbError::NotFound {
                entity: "Activity type",
                id: id.get(),
            })?;
        let updated = patch.apply(&original)?;

        let changes = self.conn.execute(
            "
            UPDATE activity_types
            SET name = ?, toggle = ?, start_label = ?, end_label = ?, category_id = ?,
                description = ?
            WHERE id = ?
            ",
            params![
                updated.name,
                updated.toggle,
                updated.start_label,
                updated.end_label,
                updated.category_id,
                updated.description,
                id.get(),
            ],
        )?;
        tracing::debug!(%id, changes, "updated activity type");
        Ok(changes)
    }

    /// Deletes an activity type and its activities.
    pub fn delete_activity_type(&mut self, id: ActivityTypeId) -> Result<usize, DbError> {
        let changes = self
            .conn
            .execute("DELETE FROM activity_types WHERE id = ?", [id.get()])?;
        if changes == 0 {
            return Err(DbError::NotFound {
                entity: "Activity type",
                id: id.get(),
            });
        }
        tracing::debug!(%id, "deleted activity type");
        Ok(changes)
    }

    // ========== Activities ==========

    /// Logs an activity and returns its ID.
    pub fn log_activity(&mut self, activity: &NewActivity) -> Result<ActivityId, DbError> {
        if self.get_activity_type(activity.type_id)?.is_none() {
            return Err(DbError::NotFound {
                entity: "Activity type",
                id: activity.type_id.get(),
            });
        }
        self.conn.execute(
            "
            INSERT INTO activities (type_id, timestamp, status, description)
            VALUES (?, ?, ?, ?)
            ",
            params![
                activity.type_id.get(),
                activity.timestamp,
                activity.status.as_ref().map(ActivityStatus::as_str),
                activity.description,
            ],
        )?;
        let id = ActivityId::from(self.conn.last_insert_rowid());
        tracing::debug!(%id, type_id = %activity.type_id, "logged activity");
        Ok(id)
    }

    /// Returns the most recent activity for a type.
    ///
    /// Activities with equal timestamps are ordered by ID, so the one logged
    /// last wins.
    pub fn last_activity(&self, type_id: ActivityTypeId) -> Result<Option<Activity>, DbError> {
        let activity = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ACTIVITY_COLUMNS} FROM activities
                     WHERE type_id = ?
                     ORDER BY timestamp DESC, id DESC
                     LIMIT 1"
                ),
                [type_id.get()],
                activity_from_row,
            )
            .optional()?;
        Ok(activity)
    }

    /// Gets a single activity.
    pub fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>, DbError> {
        let activity = self
            .conn
            .query_row(
                &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?"),
                [id.get()],
                activity_from_row,
            )
            .optional()?;
        Ok(activity)
    }

    /// Lists every activity of a type, newest first.
    ///
    /// Fails with [`DbError::NotFound`] if the type does not exist, so an
    /// unknown type is not mistaken for one with no history.
    pub fn list_activities_for_type(
        &self,
        type_id: ActivityTypeId,
    ) -> Result<Vec<Activity>, DbError> {
        if self.get_activity_type(type_id)?.is_none() {
            return Err(DbError::NotFound {
                entity: "Activity type",
                id: type_id.get(),
            });
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE type_id = ?
             ORDER BY timestamp DESC, id DESC"
        ))?;
        let rows = stmt.query_map([type_id.get()], activity_from_row)?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?);
        }
        Ok(activities)
    }

    /// Applies a partial update to a logged activity and returns the number
    /// of changed rows.
    pub fn update_activity(
        &mut self,
        id: ActivityId,
        patch: &ActivityPatch,
    ) -> Result<usize, DbError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }
        let original = self.get_activity(id)?.ok_or(DbError::NotFound {
            entity: "Activity",
            id: id.get(),
        })?;
        let updated = patch.apply(&original)?;

        let changes = self.conn.execute(
            "UPDATE activities SET timestamp = ?, status = ?, description = ? WHERE id = ?",
            params![
                updated.timestamp,
                updated.status.as_ref().map(ActivityStatus::as_str),
                updated.description,
                id.get(),
            ],
        )?;
        tracing::debug!(%id, changes, "updated activity");
        Ok(changes)
    }

    /// Deletes a logged activity.
    pub fn delete_activity(&mut self, id: ActivityId) -> Result<usize, DbError> {
        let changes = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?", [id.get()])?;
        if changes == 0 {
            return Err(DbError::NotFound {
                entity: "Activity",
                id: id.get(),
            });
        }
        tracing::debug!(%id, "deleted activity");
        Ok(changes)
    }

    // ========== TV shows ==========

    /// Adds a TV show, rejecting empty and duplicate titles.
    pub fn add_tv_show(&mut self, title: &str) -> Result<i64, DbError> {
        if title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" }.into());
        }
        if self.find_tv_show_by_title(title)?.is_some() {
            return Err(DbError::DuplicateTvShow(title.to_string()));
        }
        self.conn
            .execute("INSERT INTO tv_shows (title) VALUES (?)", [title])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Adds several TV shows.
    ///
    /// Every problem title is reported and nothing is inserted if any fail.
    pub fn add_tv_shows<S: AsRef<str>>(&mut self, titles: &[S]) -> Result<Vec<i64>, DbError> {
        let mut issues = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for title in titles {
            let title: &str = title.as_ref();
            let problem = if title.trim().is_empty() {
                Some(TvShowProblem::MissingTitle)
            } else if !seen.insert(title) || self.find_tv_show_by_title(title)?.is_some() {
                Some(TvShowProblem::AlreadyExists)
            } else {
                None
            };
            if let Some(problem) = problem {
                issues.push(TvShowIssue {
                    title: title.to_string(),
                    problem,
                });
            }
        }
        if !issues.is_empty() {
            return Err(DbError::TvShowBatch(issues));
        }

        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(titles.len());
        for title in titles {
            let title: &str = title.as_ref();
            tx.execute("INSERT INTO tv_shows (title) VALUES (?)", [title])?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Lists TV shows ordered by title.
    pub fn list_tv_shows(&self) -> Result<Vec<TvShow>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM tv_shows ORDER BY title ASC, id ASC")?;
        let rows = stmt.query_map([], tv_show_from_row)?;
        let mut shows = Vec::new();
        for row in rows {
            shows.push(row?);
        }
        Ok(shows)
    }

    pub fn get_tv_show(&self, id: i64) -> Result<Option<TvShow>, DbError> {
        let show = self
            .conn
            .query_row(
                "SELECT id, title FROM tv_shows WHERE id = ?",
                [id],
                tv_show_from_row,
            )
            .optional()?;
        Ok(show)
    }

    pub fn find_tv_show_by_title(&self, title: &str) -> Result<Option<TvShow>, DbError> {
        let show = self
            .conn
            .query_row(
                "SELECT id, title FROM tv_shows WHERE title = ?",
                [title],
                tv_show_from_row,
            )
            .optional()?;
        Ok(show)
    }

    /// Renames a TV show and returns the number of changed rows.
    pub fn rename_tv_show(&mut self, id: i64, title: &str) -> Result<usize, DbError> {
        if title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" }.into());
        }
        if self.get_tv_show(id)?.is_none() {
            return Err(DbError::NotFound {
                entity: "TV show",
                id,
            });
        }
        if let Some(existing) = self.find_tv_show_by_title(title)? {
            if existing.id != id {
                return Err(DbError::DuplicateTvShow(title.to_string()));
            }
        }
        let changes = self
            .conn
            .execute("UPDATE tv_shows SET title = ? WHERE id = ?", params![title, id])?;
        Ok(changes)
    }

    pub fn delete_tv_show(&mut self, id: i64) -> Result<usize, DbError> {
        let changes = self.conn.execute("DELETE FROM tv_shows WHERE id = ?", [id])?;
        if changes == 0 {
            return Err(DbError::NotFound {
                entity: "TV show",
                id,
            });
        }
        Ok(changes)
    }
}

impl ActivitySource for Database {
    type Error = DbError;

    async fn list_activity_types(&self) -> Result<Vec<ActivityType>, DbError> {
        Self::list_activity_types(self)
    }

    async fn last_activity_for_type(
        &self,
        type_id: ActivityTypeId,
    ) -> Result<Option<Activity>, DbError> {
        self.last_activity(type_id)
    }
}

fn insert_activity_type(
    conn: &Connection,
    new_type: &NewActivityType,
) -> Result<ActivityTypeId, DbError> {
    conn.execute(
        "
        INSERT INTO activity_types (name, toggle, start_label, end_label, category_id, description)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
        params![
            new_type.name,
            new_type.toggle,
            new_type.start_label,
            new_type.end_label,
            new_type.category_id,
            new_type.description,
        ],
    )?;
    Ok(ActivityTypeId::from(conn.last_insert_rowid()))
}

fn activity_type_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityType> {
    Ok(ActivityType {
        id: ActivityTypeId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        toggle: row.get(2)?,
        start_label: row.get(3)?,
        end_label: row.get(4)?,
        category_id: row.get(5)?,
        description: row.get(6)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: ActivityId::from(row.get::<_, i64>(0)?),
        type_id: ActivityTypeId::from(row.get::<_, i64>(1)?),
        timestamp: row.get(2)?,
        status: row.get::<_, Option<String>>(3)?.map(ActivityStatus::from),
        description: row.get(4)?,
    })
}

fn tv_show_from_row(row: &Row<'_>) -> rusqlite::Result<TvShow> {
    Ok(TvShow {
        id: row.get(0)?,
        title: row.get(1)?,
    })
}
