//! Infrastructure adapters

mod in_memory_remote;
mod reqwest_client;
mod system_clock;

pub use in_memory_remote::{InMemoryRemoteService, seed_posts};
pub use reqwest_client::ReqwestHttpClient;
pub use system_clock::SystemClock;
