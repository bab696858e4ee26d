//! Application use cases (business logic orchestration).

mod auth;
mod feed;

pub use auth::{Login, Register};
pub use feed::{CreatePost, LoadFeed, RefreshFeed, lock_feed};
