//! Core domain logic for the activity logger.
//!
//! This crate derives the activity menu:
//! - Toggle resolution: which action (start, end, or a plain log) each type offers next
//! - Elapsed time: how long ago each type was last logged
//! - Menu assembly: the flat v1 menu and the grouped, recency-sorted v2 menu

pub mod elapsed;
pub mod extract;
mod menu;
pub mod toggle;
pub mod types;

pub use elapsed::{NOT_AVAILABLE, format_elapsed};
pub use extract::{GAME_MARKER, active_game, extract_marked};
pub use menu::{
    ActivitySource, MenuError, MenuV1, MenuV2, derive_menu_v1, derive_menu_v1_at,
    derive_menu_v2, derive_menu_v2_at, menu_v1_for, menu_v2_for,
};
pub use toggle::{MenuItem, MenuStatus, resolve};
pub use types::{
    Activity, ActivityId, ActivityPatch, ActivityStatus, ActivityType, ActivityTypeId,
    ActivityTypePatch, NewActivity, NewActivityType, ValidationError,
};
