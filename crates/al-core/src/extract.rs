//! Pulls structured values out of free-text activity descriptions.

use crate::elapsed::NOT_AVAILABLE;

/// Marker that precedes the game name in a gaming activity's description.
pub const GAME_MARKER: &str = "Game: ";

/// Returns the text after the first `marker` in `text`.
///
/// The value runs until the next occurrence of `marker` or the end of the
/// text. Returns [`NOT_AVAILABLE`] when the marker is missing or the value
/// is empty.
pub fn extract_marked<'a>(text: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return NOT_AVAILABLE;
    }
    let Some((_, rest)) = text.split_once(marker) else {
        return NOT_AVAILABLE;
    };
    let value = rest.split(marker).next().unwrap_or_default();
    if value.is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

/// Extracts the active game name from a description, if one is recorded.
pub fn active_game(description: &str) -> Option<&str> {
    match extract_marked(description, GAME_MARKER) {
        NOT_AVAILABLE => None,
        game => Some(game),
    }
}
