//! Murmur Domain - Core business types
//!
//! This crate defines the domain model of the Murmur client core: posts,
//! the feed state machine, authentication payloads and client settings.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod id;
pub mod post;
pub mod request;
pub mod settings;
pub mod state;

pub use auth::{LoginRequest, MIN_PASSWORD_LENGTH, RegisterRequest, RegistrationForm, Session};
pub use error::{ApiError, ApiErrorKind, ValidationError};
pub use id::generate_id;
pub use post::{LOCAL_AUTHOR, MAX_POST_LENGTH, Post, normalize_post_text};
pub use request::{ApiRequest, HttpMethod};
pub use settings::{BackendKind, ClientSettings, Platform, SettingsError};
pub use state::{CreateTicket, FeedState, LoadOutcome, LoadTicket, RefreshTicket};
