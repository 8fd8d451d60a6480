//! Comment aggregate store.
//!
//! Listing entries and lazily loaded replies share one normalized table keyed
//! by `_id`, with a parent→children index on the side. Approving or deleting a
//! comment therefore updates every view of it at once, whether it was reached
//! through the listing or through an open reply thread.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use community_hub_shared::{
    validation::validate_new_comment, Comment, CommentPatch, CommentQuery, NewComment, Pagination,
};
use tokio::sync::watch;

use super::{replies::ReplyThread, FetchFence, FetchOutcome, KeyedFence};
use crate::{api::CommentService, config::ClientConfig, error::ClientError};

/// Behaviour switches of a [`CommentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStoreOptions {
    /// Forward `approved` to the server instead of filtering locally.
    pub server_approved_filter: bool,
    /// Page size used to keep pagination consistent after deletes.
    pub page_size: u32,
}

impl Default for CommentStoreOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for CommentStoreOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            server_approved_filter: config.server_approved_filter,
            page_size: config.page_size,
        }
    }
}

/// Everything a view needs to render comments. Published as one value per
/// completed operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentState {
    pub(super) records: HashMap<String, Comment>,
    pub(super) children: HashMap<String, Vec<String>>,
    pub(super) listing: Vec<String>,
    pub(super) threads: HashMap<String, ReplyThread>,
    /// Pagination of the held listing.
    pub pagination: Pagination,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next successful one.
    pub error: Option<String>,
    /// Query of the listing currently held.
    pub query: CommentQuery,
}

impl CommentState {
    /// The held listing, in server order.
    pub fn comments(&self) -> Vec<Comment> {
        self.listing
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }

    /// Number of listed comments.
    pub fn len(&self) -> usize {
        self.listing.len()
    }

    /// Whether the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.listing.is_empty()
    }

    /// Any comment known to the store, listed or loaded as a reply.
    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.records.get(id)
    }

    /// Cached replies of `parent_id`; empty until the reply loader fetched
    /// them.
    pub fn replies_of(&self, parent_id: &str) -> Vec<Comment> {
        self.children
            .get(parent_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.records.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reply loader state of `parent_id`.
    pub fn reply_thread(&self, parent_id: &str) -> ReplyThread {
        self.threads.get(parent_id).copied().unwrap_or_default()
    }

    /// Nested view of `root_id` with cached replies materialized down to
    /// `max_depth` levels below the root.
    pub fn thread(&self, root_id: &str, max_depth: usize) -> Option<Comment> {
        self.materialize(root_id, 0, max_depth)
    }

    fn materialize(&self, id: &str, depth: usize, max_depth: usize) -> Option<Comment> {
        let mut comment = self.records.get(id)?.clone();
        let replies = if depth < max_depth {
            self.children
                .get(id)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|child| self.materialize(child, depth + 1, max_depth))
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        comment.replies = Some(replies);
        Some(comment)
    }

    /// Insert or refresh one record. Embedded `replies` are moved into the
    /// table and the children index.
    pub(super) fn absorb(&mut self, mut comment: Comment) {
        if let Some(replies) = comment.replies.take() {
            let ids = replies.iter().map(|reply| reply.id.clone()).collect();
            self.children.insert(comment.id.clone(), ids);
            for reply in replies {
                self.absorb(reply);
            }
        }
        if let Some(existing) = self.records.get(&comment.id) {
            if comment.reply_count.is_none() {
                comment.reply_count = existing.reply_count;
            }
        }
        self.records.insert(comment.id.clone(), comment);
    }

    /// Replace the cached reply set of `parent_id`.
    pub(super) fn set_children(&mut self, parent_id: &str, replies: Vec<Comment>) {
        let ids: Vec<String> = replies.iter().map(|reply| reply.id.clone()).collect();
        if let Some(previous) = self.children.get(parent_id) {
            let kept: HashSet<&String> = ids.iter().collect();
            let dropped: Vec<String> = previous
                .iter()
                .filter(|id| !kept.contains(id))
                .cloned()
                .collect();
            for id in dropped {
                self.drop_subtree(&id);
            }
        }
        if let Some(parent) = self.records.get_mut(parent_id) {
            parent.reply_count = Some(u32::try_from(ids.len()).unwrap_or(u32::MAX));
        }
        self.children.insert(parent_id.to_string(), ids);
        for reply in replies {
            self.absorb(reply);
        }
    }

    /// Swap in a fresh copy of a known record. Unknown ids are ignored.
    pub(super) fn replace(&mut self, comment: Comment) -> bool {
        if !self.records.contains_key(&comment.id) {
            return false;
        }
        self.absorb(comment);
        true
    }

    /// Remove a record, its cached replies, and its place in the listing and
    /// in its parent's reply set. Returns whether it was part of the listing.
    pub(super) fn remove(&mut self, id: &str) -> bool {
        let before = self.listing.len();
        self.listing.retain(|listed| listed != id);
        let in_listing = self.listing.len() != before;

        if let Some(record) = self.records.get(id) {
            if let Some(parent_id) = record.parent_id.clone() {
                let mut was_indexed = false;
                if let Some(siblings) = self.children.get_mut(&parent_id) {
                    let before = siblings.len();
                    siblings.retain(|sibling| sibling != id);
                    was_indexed = siblings.len() != before;
                }
                if was_indexed {
                    if let Some(parent) = self.records.get_mut(&parent_id) {
                        parent.reply_count =
                            parent.reply_count.map(|count| count.saturating_sub(1));
                    }
                }
            }
        }
        self.drop_subtree(id);
        in_listing
    }

    fn drop_subtree(&mut self, id: &str) {
        let mut stack = vec![id.to_string()];
        while let Some(next) = stack.pop() {
            self.records.remove(&next);
            self.threads.remove(&next);
            if let Some(kids) = self.children.remove(&next) {
                stack.extend(kids);
            }
        }
    }

    /// Forget records no longer reachable from the listing.
    fn prune(&mut self) {
        let mut reachable: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = self.listing.clone();
        while let Some(id) = stack.pop() {
            if !reachable.insert(id.clone()) {
                continue;
            }
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().cloned());
            }
        }
        self.records.retain(|id, _| reachable.contains(id));
        self.children.retain(|id, _| reachable.contains(id));
        self.threads.retain(|id, _| reachable.contains(id));
    }
}

/// Fetches, caches and mutates comments for one scope.
pub struct CommentStore {
    pub(super) service: Arc<dyn CommentService>,
    pub(super) state: watch::Sender<CommentState>,
    pub(super) reply_fence: KeyedFence,
    fence: FetchFence,
    options: CommentStoreOptions,
}

impl CommentStore {
    /// Empty store over `service`.
    pub fn new(service: Arc<dyn CommentService>, options: CommentStoreOptions) -> Self {
        let (state, _) = watch::channel(CommentState::default());
        Self {
            service,
            state,
            reply_fence: KeyedFence::default(),
            fence: FetchFence::default(),
            options,
        }
    }

    /// Options the store was built with.
    pub fn options(&self) -> CommentStoreOptions {
        self.options
    }

    /// Observe every completed mutation.
    pub fn subscribe(&self) -> watch::Receiver<CommentState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> CommentState {
        self.state.borrow().clone()
    }

    /// The held listing.
    pub fn comments(&self) -> Vec<Comment> {
        self.state.borrow().comments()
    }

    /// Message of the last failed fetch.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Replace the held listing with the result of `query`.
    ///
    /// On failure the previous listing is kept and the error is recorded for
    /// passive display as well as returned. A response that arrives after a
    /// newer fetch was issued is dropped.
    pub async fn fetch_comments(&self, query: CommentQuery) -> Result<FetchOutcome, ClientError> {
        let ticket = self.fence.issue();
        self.state.send_modify(|state| state.loading = true);

        let mut request = query.clone();
        if !self.options.server_approved_filter {
            request.approved = None;
        }
        let result = self.service.list_comments(&request).await;

        if !self.fence.is_current(ticket) {
            tracing::debug!("dropping superseded comment fetch #{ticket}");
            return result.map(|_| FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                let total = page.items.len();
                let comments: Vec<Comment> = page
                    .items
                    .into_iter()
                    .filter(|comment| query.matches(comment))
                    .collect();
                if comments.len() != total {
                    tracing::debug!(
                        "filtered {} of {total} comments locally for {:?}",
                        total - comments.len(),
                        query
                    );
                }
                self.state.send_modify(|state| {
                    state.listing = comments.iter().map(|comment| comment.id.clone()).collect();
                    for comment in comments {
                        state.absorb(comment);
                    }
                    state.prune();
                    state.pagination = page.pagination;
                    state.query = query;
                    state.loading = false;
                    state.error = None;
                });
                Ok(FetchOutcome::Applied)
            },
            Err(err) => {
                tracing::warn!("comment fetch failed: {err}");
                let message = err.user_message();
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(err)
            },
        }
    }

    /// Re-run the query of the held listing.
    pub async fn refresh(&self) -> Result<FetchOutcome, ClientError> {
        let query = self.state.borrow().query.clone();
        self.fetch_comments(query).await
    }

    /// Submit a comment or reply. Nothing is inserted locally: new comments
    /// stay invisible until an admin approves them.
    pub async fn create_comment(&self, comment: NewComment) -> Result<Comment, ClientError> {
        validate_new_comment(&comment)?;
        let created = self.service.create_comment(&comment).await?;
        tracing::info!("comment {} submitted for approval", created.id);
        Ok(created)
    }

    /// Update approval state; the held copy is replaced only after the server
    /// confirms.
    pub async fn update_comment(
        &self,
        id: &str,
        patch: CommentPatch,
    ) -> Result<Comment, ClientError> {
        let updated = self.service.update_comment(id, patch).await?;
        tracing::info!("comment {id} is_approved={}", updated.is_approved);
        let applied = updated.clone();
        self.state.send_if_modified(|state| state.replace(applied));
        Ok(updated)
    }

    /// Make a comment publicly visible.
    pub async fn approve(&self, id: &str) -> Result<Comment, ClientError> {
        self.update_comment(id, CommentPatch {
            is_approved: true,
        })
        .await
    }

    /// Withdraw approval of a comment.
    pub async fn reject(&self, id: &str) -> Result<Comment, ClientError> {
        self.update_comment(id, CommentPatch {
            is_approved: false,
        })
        .await
    }

    /// Delete permanently. The held copy (and any cached replies below it) is
    /// removed only after the server confirms.
    pub async fn delete_comment(&self, id: &str) -> Result<(), ClientError> {
        self.service.delete_comment(id).await?;
        tracing::info!("comment {id} deleted");
        let page_size = self.options.page_size;
        self.state.send_modify(|state| {
            if state.remove(id) {
                state.pagination.record_removed(page_size);
            }
        });
        Ok(())
    }

    /// Drop all held data. In-flight fetches and reply loads issued before the
    /// reset are discarded when they complete.
    pub fn reset(&self) {
        self.fence.issue();
        self.reply_fence.clear();
        self.state.send_replace(CommentState::default());
    }
}
