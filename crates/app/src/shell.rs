//! State container handed to the presentation layer.
//!
//! [`ClientShell`] owns the feed and the current session and exposes the
//! client operations as their only mutators. Screens call these methods and
//! render [`ClientShell::feed`] and [`ClientShell::session`].

use std::sync::{Arc, Mutex};

use murmur_application::{
    ClientResult, Clock, CreatePost, HttpRemoteService, LoadFeed, Login, RefreshFeed, Register,
    RemoteService, lock_feed,
};
use murmur_domain::{
    BackendKind, ClientSettings, FeedState, LOCAL_AUTHOR, LoadOutcome, Post, RegistrationForm,
    Session,
};
use murmur_infrastructure::{InMemoryRemoteService, ReqwestHttpClient, SystemClock};

use crate::config;
use crate::error::StartupError;

/// Client state container: session, feed and the operations on them.
pub struct ClientShell {
    settings: ClientSettings,
    feed: Mutex<FeedState>,
    session: tokio::sync::Mutex<Option<Session>>,
    login: Login<dyn RemoteService>,
    register: Register<dyn RemoteService>,
    load: LoadFeed<dyn RemoteService>,
    create: CreatePost<dyn RemoteService, dyn Clock>,
    refresh: RefreshFeed<dyn RemoteService>,
}

impl ClientShell {
    /// Creates a shell over an explicit remote service and clock.
    #[must_use]
    pub fn new(
        settings: ClientSettings,
        service: Arc<dyn RemoteService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let retry = settings.retry_reads_on_timeout;
        Self {
            settings,
            feed: Mutex::new(FeedState::new()),
            session: tokio::sync::Mutex::new(None),
            login: Login::new(Arc::clone(&service)),
            register: Register::new(Arc::clone(&service)),
            load: LoadFeed::new(Arc::clone(&service), retry),
            create: CreatePost::new(Arc::clone(&service), clock),
            refresh: RefreshFeed::new(service, retry),
        }
    }

    /// Builds a shell whose backend is chosen by `settings.backend`.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] if the settings are invalid or the HTTP
    /// client cannot be created.
    pub fn from_settings(settings: ClientSettings) -> Result<Self, StartupError> {
        settings.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let service: Arc<dyn RemoteService> = match settings.backend {
            BackendKind::Http => {
                let client = ReqwestHttpClient::from_settings(&settings)?;
                Arc::new(HttpRemoteService::new(client))
            }
            BackendKind::Memory => Arc::new(InMemoryRemoteService::new(Arc::clone(&clock))),
        };

        tracing::info!(
            backend = ?settings.backend,
            base_url = %settings.base_url(),
            platform = %settings.platform,
            "client shell ready"
        );

        Ok(Self::new(settings, service, clock))
    }

    /// Builds a shell from `MURMUR_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] for invalid variables or settings.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_settings(config::from_env()?)
    }

    /// The settings this shell was built with.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The resolved base endpoint.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.settings.base_url()
    }

    /// Signs in and keeps the resulting session.
    ///
    /// # Errors
    ///
    /// Returns a validation error (no request sent) or the service error.
    /// The previous session, if any, is kept on failure.
    pub async fn login(&self, identifier: &str, password: &str) -> ClientResult<Session> {
        let session = self.login.execute(identifier, password).await?;
        *self.session.lock().await = Some(session.clone());
        Ok(session)
    }

    /// Registers a new account and keeps the resulting session.
    ///
    /// # Errors
    ///
    /// Returns a validation error (no request sent) or the service error.
    pub async fn register(&self, form: &RegistrationForm) -> ClientResult<Session> {
        let session = self.register.execute(form).await?;
        *self.session.lock().await = Some(session.clone());
        Ok(session)
    }

    /// Drops the current session locally and returns it.
    pub async fn logout(&self) -> Option<Session> {
        let previous = self.session.lock().await.take();
        if let Some(session) = &previous {
            tracing::info!(identifier = %session.identifier, "logged out");
        }
        previous
    }

    /// The current session, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Snapshot of the feed for rendering.
    #[must_use]
    pub fn feed(&self) -> FeedState {
        lock_feed(&self.feed).clone()
    }

    /// Replaces the feed with the service's posts.
    ///
    /// # Errors
    ///
    /// Returns the service error; the posts are left unchanged.
    pub async fn load_feed(&self) -> ClientResult<LoadOutcome> {
        self.load.execute(&self.feed).await
    }

    /// Publishes a post and prepends it optimistically.
    ///
    /// The author is the signed-in identifier, or `"You"` without a session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank or overlong text (no request
    /// sent) or the service error.
    pub async fn create_post(&self, text: &str) -> ClientResult<Post> {
        let author = self
            .session
            .lock()
            .await
            .as_ref()
            .map_or_else(|| LOCAL_AUTHOR.to_string(), |s| s.identifier.clone());

        self.create.execute(&self.feed, text, &author).await
    }

    /// Reloads the feed under the `refreshing` flag.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying load.
    pub async fn refresh_feed(&self) -> ClientResult<LoadOutcome> {
        self.refresh.execute(&self.feed).await
    }
}
