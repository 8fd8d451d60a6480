//! Admin moderation view over the comment store.
//!
//! Filtering and badge counts are computed from the page the store currently
//! holds, not from server-side totals.

use std::{fmt, str::FromStr, sync::Arc};

use community_hub_shared::{Comment, CommentQuery};

use super::{comments::CommentStore, FetchOutcome};
use crate::error::ClientError;

/// Moderation tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModerationFilter {
    /// Every held comment.
    #[default]
    All,
    /// Awaiting approval.
    Pending,
    /// Publicly visible.
    Approved,
}

impl ModerationFilter {
    /// Tabs in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Pending, Self::Approved];

    /// Whether `comment` belongs on this tab.
    pub fn matches(&self, comment: &Comment) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !comment.is_approved,
            Self::Approved => comment.is_approved,
        }
    }

    /// Lowercase tab name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }

    /// Value of the `approved` query parameter for this filter.
    pub fn approved_param(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Pending => Some(false),
            Self::Approved => Some(true),
        }
    }
}

impl fmt::Display for ModerationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(format!("unknown moderation filter `{other}` (all|pending|approved)")),
        }
    }
}

/// Tab badge counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModerationCounts {
    /// Held comments.
    pub all: usize,
    /// Held comments awaiting approval.
    pub pending: usize,
    /// Held approved comments.
    pub approved: usize,
}

impl ModerationCounts {
    /// Count shown on the badge of `filter`.
    pub fn get(&self, filter: ModerationFilter) -> usize {
        match filter {
            ModerationFilter::All => self.all,
            ModerationFilter::Pending => self.pending,
            ModerationFilter::Approved => self.approved,
        }
    }
}

/// Comments that belong on the `filter` tab, in listing order.
pub fn filter_comments(comments: &[Comment], filter: ModerationFilter) -> Vec<Comment> {
    comments
        .iter()
        .filter(|comment| filter.matches(comment))
        .cloned()
        .collect()
}

/// Badge counts for `comments`.
pub fn count_by_status(comments: &[Comment]) -> ModerationCounts {
    let approved = comments.iter().filter(|comment| comment.is_approved).count();
    ModerationCounts {
        all: comments.len(),
        pending: comments.len() - approved,
        approved,
    }
}

/// Admin comment listing with status tabs and a two-step delete.
pub struct ModerationView {
    store: Arc<CommentStore>,
    filter: ModerationFilter,
    pending_delete: Option<String>,
    base_query: CommentQuery,
}

impl ModerationView {
    /// Moderate every comment, unfiltered.
    pub fn new(store: Arc<CommentStore>) -> Self {
        Self::with_query(store, CommentQuery::default())
    }

    /// Moderate the listing described by `base_query`; its `approved` field
    /// is owned by the selected filter.
    pub fn with_query(store: Arc<CommentStore>, mut base_query: CommentQuery) -> Self {
        base_query.approved = None;
        Self {
            store,
            filter: ModerationFilter::All,
            pending_delete: None,
            base_query,
        }
    }

    /// Start on `filter` without fetching.
    pub fn with_filter(mut self, filter: ModerationFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Underlying comment store.
    pub fn store(&self) -> &Arc<CommentStore> {
        &self.store
    }

    /// Selected tab.
    pub fn filter(&self) -> ModerationFilter {
        self.filter
    }

    /// Comment awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Held comments that pass the selected filter.
    pub fn visible(&self) -> Vec<Comment> {
        filter_comments(&self.store.comments(), self.filter)
    }

    /// Badge counts over the held page.
    pub fn counts(&self) -> ModerationCounts {
        count_by_status(&self.store.comments())
    }

    fn query(&self) -> CommentQuery {
        let mut query = self.base_query.clone();
        if self.store.options().server_approved_filter {
            query.approved = self.filter.approved_param();
        }
        query
    }

    /// Switch tabs. Only re-fetches when the server applies the filter;
    /// otherwise the held page is filtered in place.
    pub async fn select_filter(
        &mut self,
        filter: ModerationFilter,
    ) -> Result<FetchOutcome, ClientError> {
        let changed = self.filter != filter;
        self.filter = filter;
        if changed && self.store.options().server_approved_filter {
            return self.refresh().await;
        }
        Ok(FetchOutcome::Applied)
    }

    /// Re-fetch the moderated listing with the selected filter applied.
    pub async fn refresh(&self) -> Result<FetchOutcome, ClientError> {
        self.store.fetch_comments(self.query()).await
    }

    /// Load another page of the moderated listing.
    pub async fn go_to_page(&mut self, page: u32) -> Result<FetchOutcome, ClientError> {
        self.base_query.page = Some(page.max(1));
        self.refresh().await
    }

    /// Approve a comment; visible again under the approved tab.
    pub async fn approve(&self, id: &str) -> Result<Comment, ClientError> {
        self.store.approve(id).await
    }

    /// Withdraw approval.
    pub async fn reject(&self, id: &str) -> Result<Comment, ClientError> {
        self.store.reject(id).await
    }

    /// First step of a delete: remember the target until confirmed.
    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_string());
    }

    /// Drop the pending delete without touching anything.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the remembered target. Returns the deleted id, or `None` when
    /// nothing was awaiting confirmation. The target is forgotten either way.
    pub async fn confirm_delete(&mut self) -> Result<Option<String>, ClientError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };
        self.store.delete_comment(&id).await?;
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn comment(id: &str, approved: bool) -> Comment {
        Comment {
            id: id.to_string(),
            content: "text".to_string(),
            author_name: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            is_approved: approved,
            created_at: Utc::now(),
            updated_at: None,
            parent_id: None,
            event_id: None,
            reply_count: None,
            replies: None,
        }
    }

    #[test]
    fn counts_partition_the_held_page() {
        let comments = vec![
            comment("a", true),
            comment("b", false),
            comment("c", false),
            comment("d", true),
            comment("e", false),
        ];
        let counts = count_by_status(&comments);
        assert_eq!(counts, ModerationCounts {
            all: 5,
            pending: 3,
            approved: 2,
        });

        for filter in ModerationFilter::ALL {
            assert_eq!(filter_comments(&comments, filter).len(), counts.get(filter));
        }
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!("Pending".parse::<ModerationFilter>(), Ok(ModerationFilter::Pending));
        assert_eq!(ModerationFilter::Approved.to_string(), "approved");
        assert!("spam".parse::<ModerationFilter>().is_err());
        assert_eq!(ModerationFilter::Pending.approved_param(), Some(false));
        assert_eq!(ModerationFilter::All.approved_param(), None);
    }
}
