//! In-memory remote service.
//!
//! A process-local stand-in for the account and content service, selected
//! with the `memory` backend. Starts with the two placeholder posts the
//! feed shows before a real service is connected.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Duration;
use murmur_application::ports::{Clock, RemoteService};
use murmur_domain::{
    ApiError, LOCAL_AUTHOR, LoginRequest, Post, RegisterRequest, generate_id, normalize_post_text,
};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Account {
    username: String,
    email: String,
    password: String,
}

/// [`RemoteService`] backed by process memory.
pub struct InMemoryRemoteService {
    clock: Arc<dyn Clock>,
    accounts: Mutex<HashMap<String, Account>>,
    posts: Mutex<Vec<Post>>,
    /// Username of the last successful login, used as post author.
    current_user: Mutex<Option<String>>,
}

impl InMemoryRemoteService {
    /// Creates a service seeded with the placeholder feed.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let posts = seed_posts(clock.as_ref());
        Self::with_posts(clock, posts)
    }

    /// Creates a service holding the given posts, newest first.
    #[must_use]
    pub fn with_posts(clock: Arc<dyn Clock>, posts: Vec<Post>) -> Self {
        Self {
            clock,
            accounts: Mutex::new(HashMap::new()),
            posts: Mutex::new(posts),
            current_user: Mutex::new(None),
        }
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        lock(&self.accounts).len()
    }

    /// Snapshot of the stored posts, newest first.
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        lock(&self.posts).clone()
    }
}

/// Placeholder feed: a welcome post and a community post one hour older.
#[must_use]
pub fn seed_posts(clock: &dyn Clock) -> Vec<Post> {
    let now = clock.now();
    vec![
        Post::new(
            "1",
            "Welcome to the newsfeed! This is your first post.",
            LOCAL_AUTHOR,
            now,
        ),
        Post::new(
            "2",
            "Share your thoughts and ideas with the community!",
            "Community",
            now - Duration::hours(1),
        ),
    ]
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::from_status(status, Some(&json!({ "message": message })))
}

#[async_trait]
impl RemoteService for InMemoryRemoteService {
    async fn login(&self, request: &LoginRequest) -> Result<Option<Value>, ApiError> {
        let account = lock(&self.accounts)
            .values()
            .find(|a| {
                (a.email.eq_ignore_ascii_case(&request.email) || a.username == request.username)
                    && a.password == request.password
            })
            .cloned()
            .ok_or_else(|| rejected(401, "Invalid credentials"))?;

        *lock(&self.current_user) = Some(account.username.clone());
        tracing::debug!(username = %account.username, "in-memory login");

        Ok(Some(json!({
            "message": "Login successful",
            "user": { "username": account.username, "email": account.email },
        })))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Option<Value>, ApiError> {
        let key = request.email.to_lowercase();
        let mut accounts = lock(&self.accounts);

        if accounts.contains_key(&key) {
            return Err(rejected(409, "User already exists"));
        }

        accounts.insert(
            key,
            Account {
                username: request.username.clone(),
                email: request.email.clone(),
                password: request.password.clone(),
            },
        );
        drop(accounts);
        tracing::debug!(email = %request.email, "in-memory registration");

        Ok(Some(json!({
            "message": "User registered",
            "user": { "username": request.username, "email": request.email },
        })))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.posts())
    }

    async fn create_post(&self, text: &str) -> Result<Option<Value>, ApiError> {
        let text = normalize_post_text(text).map_err(|e| rejected(400, &e.to_string()))?;
        let author = lock(&self.current_user)
            .clone()
            .unwrap_or_else(|| LOCAL_AUTHOR.to_string());

        let post = Post::new(generate_id(), text, author, self.clock.now());
        let body = serde_json::to_value(&post)
            .map_err(|e| ApiError::transport(format!("Failed to encode post: {e}")))?;
        lock(&self.posts).insert(0, post);

        Ok(Some(body))
    }
}
