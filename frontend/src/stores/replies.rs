//! Lazy, per-comment reply loading.
//!
//! Replies are fetched the first time a thread is opened and cached in the
//! comment store's table; collapsing and re-opening reuse the cache. A failed
//! fetch is not cached, so the next toggle retries.

use std::sync::Arc;

use community_hub_shared::{Comment, NewComment};

use super::comments::{CommentState, CommentStore};
use crate::{config::DEFAULT_REPLY_DISPLAY_DEPTH, error::ClientError};

/// Nested view of `root_id` built from cached replies only. Reply sets that
/// were never loaded come out empty, with `reply_count` kept as reported.
pub fn build_thread(state: &CommentState, root_id: &str, max_depth: usize) -> Option<Comment> {
    state.thread(root_id, max_depth)
}

/// Per-parent reply state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyThread {
    /// Replies are shown.
    pub expanded: bool,
    /// A reply fetch is in flight.
    pub loading: bool,
    /// A reply set has been fetched at least once and is cached.
    pub loaded: bool,
}

/// What a reply toggle currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPhase {
    /// Replies hidden.
    Collapsed,
    /// First fetch in flight.
    Loading,
    /// Replies shown.
    Expanded,
}

impl ReplyThread {
    /// Phase derived from the flags; a refresh over cached replies stays expanded.
    pub fn phase(&self) -> ReplyPhase {
        if self.loading && !self.loaded {
            ReplyPhase::Loading
        } else if self.expanded {
            ReplyPhase::Expanded
        } else {
            ReplyPhase::Collapsed
        }
    }
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyToggle {
    /// Replies were fetched and the thread opened.
    Fetched,
    /// Cached replies were shown again.
    Expanded,
    /// The thread was hidden; the cache is kept.
    Collapsed,
    /// A fetch for this thread is already in flight; nothing happened.
    Busy,
}

enum ToggleStep {
    Flip(bool),
    Busy,
    Fetch,
}

/// Per-comment lazy reply loading on top of a [`CommentStore`].
#[derive(Clone)]
pub struct ReplyLoader {
    store: Arc<CommentStore>,
    display_depth: usize,
}

impl ReplyLoader {
    /// Loader with the default display depth.
    pub fn new(store: Arc<CommentStore>) -> Self {
        Self {
            store,
            display_depth: DEFAULT_REPLY_DISPLAY_DEPTH,
        }
    }

    /// Limit [`ReplyLoader::display_thread`] to `depth` levels.
    pub fn with_display_depth(mut self, depth: usize) -> Self {
        self.display_depth = depth;
        self
    }

    /// Nested view of `root_id` down to the display depth.
    pub fn display_thread(&self, root_id: &str) -> Option<Comment> {
        build_thread(&self.store.state.borrow(), root_id, self.display_depth)
    }

    /// Toggle state of `parent_id`.
    pub fn thread(&self, parent_id: &str) -> ReplyThread {
        self.store.state.borrow().reply_thread(parent_id)
    }

    /// Cached replies of `parent_id`.
    pub fn replies(&self, parent_id: &str) -> Vec<Comment> {
        self.store.state.borrow().replies_of(parent_id)
    }

    /// Open or close the reply thread of `parent_id`, fetching replies only
    /// the first time.
    pub async fn toggle(&self, parent_id: &str) -> Result<ReplyToggle, ClientError> {
        let mut step = ToggleStep::Busy;
        self.store.state.send_if_modified(|state| {
            let thread = state.threads.entry(parent_id.to_string()).or_default();
            if thread.loaded {
                thread.expanded = !thread.expanded;
                step = ToggleStep::Flip(thread.expanded);
                true
            } else if thread.loading {
                false
            } else {
                thread.loading = true;
                step = ToggleStep::Fetch;
                true
            }
        });

        match step {
            ToggleStep::Flip(true) => Ok(ReplyToggle::Expanded),
            ToggleStep::Flip(false) => Ok(ReplyToggle::Collapsed),
            ToggleStep::Busy => Ok(ReplyToggle::Busy),
            ToggleStep::Fetch => self.load(parent_id).await.map(|_| ReplyToggle::Fetched),
        }
    }

    /// Re-fetch the full reply set of `parent_id`, replacing the cache, and
    /// open the thread.
    pub async fn refresh(&self, parent_id: &str) -> Result<Vec<Comment>, ClientError> {
        self.store.state.send_modify(|state| {
            state.threads.entry(parent_id.to_string()).or_default().loading = true;
        });
        self.load(parent_id).await
    }

    /// Submit a reply, then reload the parent's replies so the thread shows
    /// exactly what the server holds.
    ///
    /// The result reflects the submission only. A failed reload is logged and
    /// leaves the thread as the loader's failure path left it.
    pub async fn submit_reply(
        &self,
        parent_id: &str,
        mut reply: NewComment,
    ) -> Result<Comment, ClientError> {
        reply.parent_id = Some(parent_id.to_string());
        if reply.event_id.is_none() {
            reply.event_id = self
                .store
                .state
                .borrow()
                .get(parent_id)
                .and_then(|parent| parent.event_id.clone());
        }
        let created = self.store.create_comment(reply).await?;
        if let Err(err) = self.refresh(parent_id).await {
            tracing::warn!(
                "reply {} was submitted but reloading comment {parent_id} failed: {err}",
                created.id
            );
        }
        Ok(created)
    }

    /// Fetch and apply the reply set of `parent_id`. A load overtaken by a
    /// newer load of the same parent (or by a store reset) returns its result
    /// without touching the store.
    async fn load(&self, parent_id: &str) -> Result<Vec<Comment>, ClientError> {
        let ticket = self.store.reply_fence.issue(parent_id);
        let result = self.store.service.list_replies(parent_id).await;

        if !self.store.reply_fence.is_current(parent_id, ticket) {
            tracing::debug!("dropping superseded reply load #{ticket} for comment {parent_id}");
            return result;
        }

        match result {
            Ok(replies) => {
                tracing::debug!("loaded {} replies for comment {parent_id}", replies.len());
                let loaded = replies.clone();
                self.store.state.send_modify(|state| {
                    state.set_children(parent_id, replies);
                    let thread = state.threads.entry(parent_id.to_string()).or_default();
                    thread.loading = false;
                    thread.loaded = true;
                    thread.expanded = true;
                });
                Ok(loaded)
            },
            Err(err) => {
                tracing::warn!("loading replies for comment {parent_id} failed: {err}");
                self.store.state.send_modify(|state| {
                    if let Some(thread) = state.threads.get_mut(parent_id) {
                        thread.loading = false;
                        if !thread.loaded {
                            thread.expanded = false;
                        }
                    }
                });
                Err(err)
            },
        }
    }
}
