//! Feed post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a post body, in characters.
pub const MAX_POST_LENGTH: usize = 500;

/// Author shown on locally created posts when no session is active.
pub const LOCAL_AUTHOR: &str = "You";

/// A single entry in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier within the feed.
    pub id: String,
    /// Post body.
    pub text: String,
    /// Display name of the author.
    pub author: String,
    /// Creation time, serialized as ISO-8601.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new post.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        author: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            author: author.into(),
            created_at,
        }
    }
}

/// Trims post text and checks it against the length limits.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyPost`] for empty or whitespace-only text
/// and [`ValidationError::PostTooLong`] when the trimmed text exceeds
/// [`MAX_POST_LENGTH`] characters.
pub fn normalize_post_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPost);
    }

    let actual = trimmed.chars().count();
    if actual > MAX_POST_LENGTH {
        return Err(ValidationError::PostTooLong {
            max: MAX_POST_LENGTH,
            actual,
        });
    }

    Ok(trimmed.to_string())
}
