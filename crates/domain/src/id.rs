//! ID generation utilities.

use uuid::Uuid;

/// Generates a new time-ordered identifier for locally created entities.
///
/// UUID v7 embeds a millisecond timestamp, so ids generated on the same
/// device sort by creation time.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
