//! Murmur - client session and feed synchronization core
//!
//! Composition root for the presentation layer: reads configuration,
//! selects the remote service backend and exposes [`ClientShell`], the
//! state container whose methods are the only way to change the session
//! and the feed.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! murmur::telemetry::init()?;
//! let shell = murmur::ClientShell::from_env()?;
//!
//! shell.login("ada@example.com", "secret1").await?;
//! shell.load_feed().await?;
//! shell.create_post("Hello from Murmur").await?;
//!
//! for post in shell.feed().posts() {
//!     println!("{}: {}", post.author, post.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod shell;
pub mod telemetry;

pub use config::ConfigError;
pub use error::StartupError;
pub use shell::ClientShell;

pub use murmur_application::{ClientError, ClientResult};
pub use murmur_domain::{
    ApiError, ApiErrorKind, ClientSettings, FeedState, LoadOutcome, Post, RegistrationForm,
    Session, ValidationError,
};
