//! Feed state machine for UI binding.
//!
//! [`FeedState`] holds the ordered post list together with the `loading`
//! and `refreshing` flags the UI renders. Every mutation goes through a
//! begin/finish pair so the caller can release the state while the network
//! call is in flight:
//!
//! - `begin_load` / `finish_load`: replace the list (last-write-wins)
//! - `begin_create` / `finish_create`: prepend an optimistic post
//! - `begin_refresh` / `finish_refresh`: toggle the pull-to-refresh flag
//!
//! Tickets returned by the `begin_*` methods are consumed by the matching
//! `finish_*` call, so an operation cannot be finished twice.

use crate::post::Post;

/// Identifies one in-flight load.
///
/// Tickets are ordered: a load holding a newer ticket supersedes any older
/// load that has not yet applied its result.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
#[must_use = "an unfinished load leaves the feed in the loading state"]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Generation number of this load.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.0
    }
}

/// Marks one in-flight post creation.
#[derive(Debug)]
#[must_use = "an unfinished create leaves the feed in the loading state"]
pub struct CreateTicket(());

/// Marks one in-flight refresh.
#[derive(Debug)]
#[must_use = "an unfinished refresh leaves the feed in the refreshing state"]
pub struct RefreshTicket(());

/// Result of finishing a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched posts replaced the feed.
    Applied,
    /// A newer load already applied its result; the posts were discarded.
    Superseded,
    /// The load failed; the feed is unchanged.
    Failed,
}

/// In-memory feed: ordered posts plus loading flags.
///
/// Posts are kept newest first in insertion order and are never re-sorted
/// by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    posts: Vec<Post>,
    /// Loads and creates currently in flight.
    pending: u32,
    /// Refreshes currently in flight.
    refreshes: u32,
    /// Last generation handed out by `begin_load`.
    issued: u64,
    /// Generation of the load whose posts are currently shown.
    applied: u64,
}

impl FeedState {
    /// Creates an empty, idle feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle feed holding the given posts.
    #[must_use]
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    /// Posts, newest first.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Returns true while a load or create is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Returns true while a refresh is in flight.
    #[must_use]
    pub const fn is_refreshing(&self) -> bool {
        self.refreshes > 0
    }

    /// Number of posts in the feed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Returns true if the feed has no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Returns true if a post with the given id is in the feed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    /// Marks a load as started and returns its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.pending += 1;
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Finishes a load.
    ///
    /// `posts` is `None` when the fetch failed. Fetched posts replace the
    /// feed wholesale, in the order given, unless a newer load has already
    /// been applied.
    pub fn finish_load(&mut self, ticket: LoadTicket, posts: Option<Vec<Post>>) -> LoadOutcome {
        self.pending = self.pending.saturating_sub(1);

        let Some(posts) = posts else {
            return LoadOutcome::Failed;
        };

        if ticket.0 < self.applied {
            return LoadOutcome::Superseded;
        }

        self.posts = posts;
        self.applied = ticket.0;
        LoadOutcome::Applied
    }

    /// Marks a post creation as started.
    pub fn begin_create(&mut self) -> CreateTicket {
        self.pending += 1;
        CreateTicket(())
    }

    /// Finishes a post creation, prepending `post` when it succeeded.
    ///
    /// A post whose id is already present is not inserted again; returns
    /// whether the post was added.
    pub fn finish_create(&mut self, ticket: CreateTicket, post: Option<Post>) -> bool {
        let CreateTicket(()) = ticket;
        self.pending = self.pending.saturating_sub(1);

        match post {
            Some(post) if !self.contains(&post.id) => {
                self.posts.insert(0, post);
                true
            }
            _ => false,
        }
    }

    /// Marks a refresh as started.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.refreshes += 1;
        RefreshTicket(())
    }

    /// Finishes a refresh, whatever the outcome of its load.
    pub fn finish_refresh(&mut self, ticket: RefreshTicket) {
        let RefreshTicket(()) = ticket;
        self.refreshes = self.refreshes.saturating_sub(1);
    }
}
