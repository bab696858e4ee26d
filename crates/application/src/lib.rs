//! Murmur Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the remote service, HTTP and time)
//! - The HTTP-backed remote service
//! - Use case orchestration for authentication and the feed
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod remote;
pub mod use_cases;

pub use error::{ClientError, ClientResult};
pub use ports::{Clock, HttpClient, RemoteService};
pub use remote::{HttpRemoteService, LOGIN_PATH, POSTS_PATH, REGISTER_PATH};
pub use use_cases::{CreatePost, LoadFeed, Login, RefreshFeed, Register, lock_feed};
