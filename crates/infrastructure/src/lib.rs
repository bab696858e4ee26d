//! Murmur Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;

pub use adapters::{InMemoryRemoteService, ReqwestHttpClient, SystemClock, seed_posts};
