//! Feed use cases: load, create and refresh.
//!
//! Each use case operates on a feed passed in by the caller. The lock is
//! held only while a state transition is applied, never across the remote
//! call, so a refresh can run while a post is being submitted.
//!
//! In-flight operations hold a guard over their ticket. A future dropped
//! midway (a caller timeout, a cancelled `select!` branch) finishes its
//! ticket as failed, so `loading` and `refreshing` always clear.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use murmur_domain::{
    ApiError, CreateTicket, FeedState, LoadOutcome, LoadTicket, Post, RefreshTicket, generate_id,
    normalize_post_text,
};

use crate::ClientResult;
use crate::ports::{Clock, RemoteService};

/// Locks the feed, recovering the state if a previous holder panicked.
#[must_use]
pub fn lock_feed(feed: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    feed.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Load ticket that is finished as failed if the load is abandoned.
struct LoadGuard<'a> {
    feed: &'a Mutex<FeedState>,
    ticket: Option<LoadTicket>,
}

impl<'a> LoadGuard<'a> {
    fn begin(feed: &'a Mutex<FeedState>) -> Self {
        let ticket = lock_feed(feed).begin_load();
        Self {
            feed,
            ticket: Some(ticket),
        }
    }

    fn generation(&self) -> u64 {
        self.ticket.as_ref().map_or(0, LoadTicket::generation)
    }

    fn finish(mut self, posts: Option<Vec<Post>>) -> LoadOutcome {
        match self.ticket.take() {
            Some(ticket) => lock_feed(self.feed).finish_load(ticket, posts),
            None => LoadOutcome::Failed,
        }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let _ = lock_feed(self.feed).finish_load(ticket, None);
            tracing::debug!("feed load abandoned");
        }
    }
}

/// Create ticket that is finished without a post if the create is abandoned.
struct CreateGuard<'a> {
    feed: &'a Mutex<FeedState>,
    ticket: Option<CreateTicket>,
}

impl<'a> CreateGuard<'a> {
    fn begin(feed: &'a Mutex<FeedState>) -> Self {
        let ticket = lock_feed(feed).begin_create();
        Self {
            feed,
            ticket: Some(ticket),
        }
    }

    fn finish(mut self, post: Option<Post>) -> bool {
        self.ticket
            .take()
            .is_some_and(|ticket| lock_feed(self.feed).finish_create(ticket, post))
    }
}

impl Drop for CreateGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            lock_feed(self.feed).finish_create(ticket, None);
            tracing::debug!("post creation abandoned");
        }
    }
}

/// Clears the `refreshing` flag when dropped.
struct RefreshGuard<'a> {
    feed: &'a Mutex<FeedState>,
    ticket: Option<RefreshTicket>,
}

impl<'a> RefreshGuard<'a> {
    fn begin(feed: &'a Mutex<FeedState>) -> Self {
        let ticket = lock_feed(feed).begin_refresh();
        Self {
            feed,
            ticket: Some(ticket),
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            lock_feed(self.feed).finish_refresh(ticket);
        }
    }
}

/// Use case for replacing the feed with the service's current posts.
pub struct LoadFeed<S: ?Sized> {
    service: Arc<S>,
    retry_on_timeout: bool,
}

impl<S: RemoteService + ?Sized> LoadFeed<S> {
    /// Creates a new `LoadFeed` use case.
    ///
    /// With `retry_on_timeout`, a fetch that times out is attempted once
    /// more before the load fails.
    #[must_use]
    pub const fn new(service: Arc<S>, retry_on_timeout: bool) -> Self {
        Self {
            service,
            retry_on_timeout,
        }
    }

    /// Fetches the feed and replaces the posts in `feed`.
    ///
    /// `loading` is set until the call completes or its future is dropped.
    /// If a newer load has already been applied when this one completes,
    /// its posts are dropped and [`LoadOutcome::Superseded`] is returned.
    ///
    /// # Errors
    /// Returns the service error; the posts are left unchanged.
    pub async fn execute(&self, feed: &Mutex<FeedState>) -> ClientResult<LoadOutcome> {
        let guard = LoadGuard::begin(feed);
        let generation = guard.generation();

        match self.fetch().await {
            Ok(posts) => {
                let count = posts.len();
                let outcome = guard.finish(Some(posts));
                match outcome {
                    LoadOutcome::Applied => {
                        tracing::info!(generation, count, "feed loaded");
                    }
                    _ => {
                        tracing::warn!(generation, "discarding stale feed response");
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                let _ = guard.finish(None);
                tracing::warn!(generation, status = e.status_code, error = %e, "feed load failed");
                Err(e.into())
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Post>, ApiError> {
        match self.service.list_posts().await {
            Err(e) if e.is_timeout() && self.retry_on_timeout => {
                tracing::warn!(error = %e, "feed load timed out, retrying once");
                self.service.list_posts().await
            }
            other => other,
        }
    }
}

/// Use case for publishing a post with an optimistic local insert.
pub struct CreatePost<S: ?Sized, K: ?Sized> {
    service: Arc<S>,
    clock: Arc<K>,
}

impl<S: RemoteService + ?Sized, K: Clock + ?Sized> CreatePost<S, K> {
    /// Creates a new `CreatePost` use case.
    #[must_use]
    pub const fn new(service: Arc<S>, clock: Arc<K>) -> Self {
        Self { service, clock }
    }

    /// Submits `text` and, once the service accepts it, prepends a post
    /// with a client-generated id and the current time.
    ///
    /// The service's response body is not used: the local entry stays until
    /// the next load replaces the feed with the server's records. Never
    /// retried.
    ///
    /// # Errors
    /// - [`crate::ClientError::Validation`] for blank or overlong text (no
    ///   request sent, feed untouched)
    /// - [`crate::ClientError::Api`] if the service rejects the post
    pub async fn execute(
        &self,
        feed: &Mutex<FeedState>,
        text: &str,
        author: &str,
    ) -> ClientResult<Post> {
        let text = normalize_post_text(text)?;

        let guard = CreateGuard::begin(feed);
        match self.service.create_post(&text).await {
            Ok(_) => {
                let post = Post::new(generate_id(), text, author, self.clock.now());
                guard.finish(Some(post.clone()));
                tracing::info!(id = %post.id, "post created");
                Ok(post)
            }
            Err(e) => {
                guard.finish(None);
                tracing::warn!(status = e.status_code, error = %e, "post creation failed");
                Err(e.into())
            }
        }
    }
}

/// Use case for pull-to-refresh: a load wrapped in the `refreshing` flag.
pub struct RefreshFeed<S: ?Sized> {
    load: LoadFeed<S>,
}

impl<S: RemoteService + ?Sized> RefreshFeed<S> {
    /// Creates a new `RefreshFeed` use case.
    #[must_use]
    pub const fn new(service: Arc<S>, retry_on_timeout: bool) -> Self {
        Self {
            load: LoadFeed::new(service, retry_on_timeout),
        }
    }

    /// Reloads the feed; `refreshing` is cleared whatever the outcome,
    /// including when the returned future is dropped.
    ///
    /// # Errors
    /// Returns the error of the underlying load.
    pub async fn execute(&self, feed: &Mutex<FeedState>) -> ClientResult<LoadOutcome> {
        let _refreshing = RefreshGuard::begin(feed);
        self.load.execute(feed).await
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::significant_drop_tightening
)]
mod tests {
    use super::*;
    use crate::ClientError;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use murmur_domain::{LoginRequest, RegisterRequest, ValidationError};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn post(id: &str) -> Post {
        Post::new(id, format!("post {id}"), "Community", fixed_time())
    }

    fn ids(state: &FeedState) -> Vec<String> {
        state.posts().iter().map(|p| p.id.clone()).collect()
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            fixed_time()
        }
    }

    /// Replies to each call with the next queued result.
    #[derive(Default)]
    struct ScriptedRemote {
        lists: StdMutex<VecDeque<Result<Vec<Post>, ApiError>>>,
        creates: StdMutex<VecDeque<Result<Option<Value>, ApiError>>>,
        list_calls: AtomicUsize,
        created_texts: StdMutex<Vec<String>>,
    }

    impl ScriptedRemote {
        fn with_lists(lists: Vec<Result<Vec<Post>, ApiError>>) -> Self {
            Self {
                lists: StdMutex::new(lists.into()),
                ..Self::default()
            }
        }

        fn with_creates(creates: Vec<Result<Option<Value>, ApiError>>) -> Self {
            Self {
                creates: StdMutex::new(creates.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl RemoteService for ScriptedRemote {
        async fn login(&self, _: &LoginRequest) -> Result<Option<Value>, ApiError> {
            Ok(None)
        }

        async fn register(&self, _: &RegisterRequest) -> Result<Option<Value>, ApiError> {
            Ok(None)
        }

        async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.lists
                .lock()
                .expect("Lock poisoned")
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn create_post(&self, text: &str) -> Result<Option<Value>, ApiError> {
            self.created_texts
                .lock()
                .expect("Lock poisoned")
                .push(text.to_string());
            self.creates
                .lock()
                .expect("Lock poisoned")
                .pop_front()
                .unwrap_or(Ok(None))
        }
    }

    #[tokio::test]
    async fn load_replaces_posts_and_clears_loading() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![Ok(vec![post("1"), post("2")])]));
        let feed = Mutex::new(FeedState::with_posts(vec![post("old")]));
        assert!(!lock_feed(&feed).is_loading());

        let outcome = LoadFeed::new(remote, false).execute(&feed).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Applied);
        let state = lock_feed(&feed);
        assert_eq!(ids(&state), vec!["1", "2"]);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_posts() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![Err(ApiError::from_status(
            500, None,
        ))]));
        let feed = Mutex::new(FeedState::with_posts(vec![post("a")]));

        let err = LoadFeed::new(remote, true).execute(&feed).await.unwrap_err();

        assert_eq!(err.as_api().map(|e| e.status_code), Some(500));
        let state = lock_feed(&feed);
        assert_eq!(ids(&state), vec!["a"]);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn timed_out_load_is_retried_once() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![
            Err(ApiError::timeout(100)),
            Ok(vec![post("1")]),
        ]));
        let feed = Mutex::new(FeedState::new());

        let outcome = LoadFeed::new(Arc::clone(&remote), true)
            .execute(&feed)
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(remote.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ids(&lock_feed(&feed)), vec!["1"]);
    }

    #[tokio::test]
    async fn timeout_retry_can_be_disabled() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![
            Err(ApiError::timeout(100)),
            Ok(vec![post("1")]),
        ]));
        let feed = Mutex::new(FeedState::new());

        let err = LoadFeed::new(Arc::clone(&remote), false)
            .execute(&feed)
            .await
            .unwrap_err();

        assert!(err.as_api().is_some_and(ApiError::is_timeout));
        assert_eq!(remote.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_timeout_failures_are_not_retried() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![
            Err(ApiError::transport("connection refused")),
            Ok(vec![post("1")]),
        ]));
        let feed = Mutex::new(FeedState::new());

        assert!(LoadFeed::new(Arc::clone(&remote), true).execute(&feed).await.is_err());
        assert_eq!(remote.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_prepends_trimmed_post() {
        let remote = Arc::new(ScriptedRemote::default());
        let feed = Mutex::new(FeedState::with_posts(vec![post("1"), post("2")]));
        let create = CreatePost::new(Arc::clone(&remote), Arc::new(FixedClock));

        let created = create.execute(&feed, "  hello world  ", "You").await.unwrap();

        assert_eq!(created.text, "hello world");
        assert_eq!(created.author, "You");
        assert_eq!(created.created_at, fixed_time());

        let state = lock_feed(&feed);
        assert_eq!(state.len(), 3);
        assert_eq!(state.posts()[0], created);
        assert!(!state.is_loading());
        assert_eq!(*remote.created_texts.lock().unwrap(), vec!["hello world"]);
    }

    #[tokio::test]
    async fn blank_post_sends_nothing() {
        let remote = Arc::new(ScriptedRemote::default());
        let feed = Mutex::new(FeedState::with_posts(vec![post("1")]));
        let create = CreatePost::new(Arc::clone(&remote), Arc::new(FixedClock));

        for text in ["", "   ", "\n\t"] {
            let err = create.execute(&feed, text, "You").await.unwrap_err();
            assert_eq!(err, ClientError::Validation(ValidationError::EmptyPost));
        }

        assert!(remote.created_texts.lock().unwrap().is_empty());
        assert_eq!(ids(&lock_feed(&feed)), vec!["1"]);
    }

    #[tokio::test]
    async fn failed_create_skips_prepend_and_is_not_retried() {
        let remote = Arc::new(ScriptedRemote::with_creates(vec![
            Err(ApiError::timeout(100)),
            Ok(Some(json!({"id": "server"}))),
        ]));
        let feed = Mutex::new(FeedState::with_posts(vec![post("1")]));
        let create = CreatePost::new(Arc::clone(&remote), Arc::new(FixedClock));

        let err = create.execute(&feed, "hello", "You").await.unwrap_err();

        assert!(err.as_api().is_some_and(ApiError::is_timeout));
        assert_eq!(remote.created_texts.lock().unwrap().len(), 1);
        let state = lock_feed(&feed);
        assert_eq!(ids(&state), vec!["1"]);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn next_load_replaces_optimistic_post() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![Ok(vec![
            post("server-1"),
            post("1"),
        ])]));
        let feed = Mutex::new(FeedState::with_posts(vec![post("1")]));

        let created = CreatePost::new(Arc::clone(&remote), Arc::new(FixedClock))
            .execute(&feed, "hello", "You")
            .await
            .unwrap();
        assert!(lock_feed(&feed).contains(&created.id));

        LoadFeed::new(remote, false).execute(&feed).await.unwrap();

        let state = lock_feed(&feed);
        assert!(!state.contains(&created.id));
        assert_eq!(ids(&state), vec!["server-1", "1"]);
    }

    #[tokio::test]
    async fn refresh_clears_flag_on_success_and_failure() {
        let remote = Arc::new(ScriptedRemote::with_lists(vec![
            Ok(vec![post("1")]),
            Err(ApiError::from_status(503, None)),
        ]));
        let feed = Mutex::new(FeedState::new());
        let refresh = RefreshFeed::new(remote, false);

        assert!(refresh.execute(&feed).await.is_ok());
        assert!(!lock_feed(&feed).is_refreshing());

        assert!(refresh.execute(&feed).await.is_err());
        let state = lock_feed(&feed);
        assert!(!state.is_refreshing());
        assert!(!state.is_loading());
        assert_eq!(ids(&state), vec!["1"]);
    }

    /// Holds each list call until the test releases it. Creates never
    /// complete.
    struct GatedRemote {
        gates: StdMutex<VecDeque<oneshot::Receiver<Vec<Post>>>>,
    }

    #[async_trait]
    impl RemoteService for GatedRemote {
        async fn login(&self, _: &LoginRequest) -> Result<Option<Value>, ApiError> {
            Ok(None)
        }

        async fn register(&self, _: &RegisterRequest) -> Result<Option<Value>, ApiError> {
            Ok(None)
        }

        async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
            let gate = self.gates.lock().expect("Lock poisoned").pop_front();
            match gate {
                Some(rx) => rx.await.map_err(|_| ApiError::transport("gate dropped")),
                None => Ok(Vec::new()),
            }
        }

        async fn create_post(&self, _: &str) -> Result<Option<Value>, ApiError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stale_load_does_not_overwrite_newer_one() {
        let (older_tx, older_rx) = oneshot::channel();
        let (newer_tx, newer_rx) = oneshot::channel();
        let remote = Arc::new(GatedRemote {
            gates: StdMutex::new(VecDeque::from([older_rx, newer_rx])),
        });
        let feed = Mutex::new(FeedState::new());
        let load = LoadFeed::new(Arc::clone(&remote), false);
        let refresh = RefreshFeed::new(remote, false);

        let release = async {
            tokio::task::yield_now().await;
            newer_tx.send(vec![post("newer")]).unwrap();
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            older_tx.send(vec![post("older")]).unwrap();
        };

        let (first, second, ()) =
            tokio::join!(load.execute(&feed), refresh.execute(&feed), release);

        let mut outcomes = vec![first.unwrap(), second.unwrap()];
        outcomes.sort_by_key(|o| *o == LoadOutcome::Superseded);
        assert_eq!(outcomes, vec![LoadOutcome::Applied, LoadOutcome::Superseded]);

        let state = lock_feed(&feed);
        assert_eq!(ids(&state), vec!["newer"]);
        assert!(!state.is_loading());
        assert!(!state.is_refreshing());
    }

    fn gated(gates: Vec<oneshot::Receiver<Vec<Post>>>) -> Arc<GatedRemote> {
        Arc::new(GatedRemote {
            gates: StdMutex::new(gates.into()),
        })
    }

    #[tokio::test]
    async fn dropped_refresh_clears_both_flags() {
        let (_hold, rx) = oneshot::channel();
        let feed = Mutex::new(FeedState::with_posts(vec![post("1")]));
        let refresh = RefreshFeed::new(gated(vec![rx]), false);

        let mut in_flight = Box::pin(refresh.execute(&feed));
        tokio::select! {
            _ = &mut in_flight => panic!("gated refresh completed"),
            () = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
        {
            let state = lock_feed(&feed);
            assert!(state.is_refreshing());
            assert!(state.is_loading());
        }

        drop(in_flight);

        let state = lock_feed(&feed);
        assert!(!state.is_refreshing());
        assert!(!state.is_loading());
        assert_eq!(ids(&state), vec!["1"]);
    }

    #[tokio::test]
    async fn timed_out_load_clears_loading_and_keeps_newer_loads_working() {
        let (_hold, rx) = oneshot::channel();
        let feed = Mutex::new(FeedState::new());
        let load = LoadFeed::new(gated(vec![rx]), false);

        let elapsed = tokio::time::timeout(Duration::from_millis(20), load.execute(&feed)).await;
        assert!(elapsed.is_err());
        assert!(!lock_feed(&feed).is_loading());

        let outcome = load.execute(&feed).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);
        assert!(!lock_feed(&feed).is_loading());
    }

    #[tokio::test]
    async fn dropped_create_clears_loading_without_prepending() {
        let feed = Mutex::new(FeedState::with_posts(vec![post("1")]));
        let create = CreatePost::new(gated(Vec::new()), Arc::new(FixedClock));

        let elapsed =
            tokio::time::timeout(Duration::from_millis(20), create.execute(&feed, "hi", "You"))
                .await;
        assert!(elapsed.is_err());

        let state = lock_feed(&feed);
        assert!(!state.is_loading());
        assert_eq!(ids(&state), vec!["1"]);
    }
}
