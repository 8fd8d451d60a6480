//! Comment records and the query and request bodies of `/comments`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resources::Resource;

/// Query value the API understands as "no parent", i.e. top-level only.
pub const TOP_LEVEL_PARENT: &str = "null";

/// A comment or reply as stored by the API.
///
/// Submissions always start unapproved; only admins flip `is_approved` or
/// delete. `content` is never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Identifier, normalized from `id` or `_id`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Comment text.
    pub content: String,
    /// Display name of the author.
    pub author_name: String,
    /// Author email; admin views only.
    pub author_email: String,
    /// Visible to the public once approved.
    #[serde(default)]
    pub is_approved: bool,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Time of the last moderation change.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Comment this one replies to; `None` for top-level comments.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Event the comment belongs to.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Number of direct replies, as reported by the server.
    #[serde(default)]
    pub reply_count: Option<u32>,
    /// Materialized children, only present on display threads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<Comment>>,
}

impl Comment {
    /// Whether this comment answers another one.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl Resource for Comment {
    const PATH: &'static str = "comments";
    const COLLECTION_KEY: &'static str = "comments";
    const ITEM_KEY: &'static str = "comment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST /comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    /// Comment text, 1 to 1000 characters.
    #[validate(custom(function = "crate::validation::comment_content"))]
    pub content: String,
    /// Author name, 2 to 50 characters.
    #[validate(custom(function = "crate::validation::comment_author_name"))]
    pub author_name: String,
    /// Author email; never shown publicly.
    #[validate(custom(function = "crate::validation::email_address"))]
    pub author_email: String,
    /// Event being commented on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Set when submitting a reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Body of `PUT /comments/:id`. Approval is the only mutable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    /// New approval state.
    pub is_approved: bool,
}

/// Parent linkage filter for comment listings.
///
/// `TopLevel` and `Any` are deliberately different: the former sends
/// `parentId=null`, the latter sends nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParentFilter {
    /// No constraint; `parentId` is omitted.
    #[default]
    Any,
    /// Top-level comments only (`parentId=null`).
    TopLevel,
    /// Direct replies of the given comment.
    ChildOf(String),
}

/// Parameters of `GET /comments`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Approval filter; forwarded only when the server supports it.
    pub approved: Option<bool>,
    /// Restrict to one event.
    pub event_id: Option<String>,
    /// Parent linkage filter.
    pub parent: ParentFilter,
}

impl CommentQuery {
    /// Top-level comments of one event.
    pub fn for_event(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            parent: ParentFilter::TopLevel,
            ..Self::default()
        }
    }

    /// Top-level comments across all events.
    pub fn top_level() -> Self {
        Self {
            parent: ParentFilter::TopLevel,
            ..Self::default()
        }
    }

    /// Set the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only approved (`true`) or pending (`false`) comments.
    pub fn approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// Whether `comment` satisfies the approval and parent constraints of this
    /// query. Used to re-apply filters locally when the server does not.
    pub fn matches(&self, comment: &Comment) -> bool {
        if let Some(approved) = self.approved {
            if comment.is_approved != approved {
                return false;
            }
        }
        match &self.parent {
            ParentFilter::Any => true,
            ParentFilter::TopLevel => comment.parent_id.is_none(),
            ParentFilter::ChildOf(parent) => comment.parent_id.as_deref() == Some(parent.as_str()),
        }
    }

    /// URL query parameters in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(approved) = self.approved {
            pairs.push(("approved", approved.to_string()));
        }
        if let Some(event_id) = &self.event_id {
            pairs.push(("eventId", event_id.clone()));
        }
        match &self.parent {
            ParentFilter::Any => {},
            ParentFilter::TopLevel => pairs.push(("parentId", TOP_LEVEL_PARENT.to_string())),
            ParentFilter::ChildOf(parent) => pairs.push(("parentId", parent.clone())),
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, approved: bool, parent: Option<&str>) -> Comment {
        Comment {
            id: id.to_string(),
            content: "hi".to_string(),
            author_name: "X".to_string(),
            author_email: "x@x.com".to_string(),
            is_approved: approved,
            created_at: Utc::now(),
            updated_at: None,
            parent_id: parent.map(str::to_string),
            event_id: None,
            reply_count: None,
            replies: None,
        }
    }

    #[test]
    fn top_level_filter_is_sent_as_null_and_any_is_omitted() {
        let top = CommentQuery::top_level().page(2).to_query_pairs();
        assert_eq!(top, vec![("page", "2".to_string()), ("parentId", "null".to_string())]);

        let any = CommentQuery::default().to_query_pairs();
        assert!(any.is_empty());
    }

    #[test]
    fn event_query_includes_event_and_approval() {
        let pairs = CommentQuery::for_event("ev-1").approved(true).limit(5).to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("limit", "5".to_string()),
                ("approved", "true".to_string()),
                ("eventId", "ev-1".to_string()),
                ("parentId", "null".to_string()),
            ]
        );
    }

    #[test]
    fn matches_applies_parent_and_approval_constraints() {
        let query = CommentQuery::top_level().approved(true);
        assert!(query.matches(&comment("a", true, None)));
        assert!(!query.matches(&comment("b", false, None)));
        assert!(!query.matches(&comment("c", true, Some("a"))));

        let children = CommentQuery {
            parent: ParentFilter::ChildOf("a".to_string()),
            ..CommentQuery::default()
        };
        assert!(children.matches(&comment("c", false, Some("a"))));
        assert!(!children.matches(&comment("d", false, Some("z"))));
    }

    #[test]
    fn deserializes_camel_case_wire_shape() {
        let raw = r#"{"_id":"a1","content":"hi","authorName":"X","authorEmail":"x@x.com",
            "isApproved":false,"createdAt":"2024-01-01T00:00:00Z","replyCount":2}"#;
        let parsed: Comment = serde_json::from_str(raw).expect("comment should parse");
        assert_eq!(parsed.id, "a1");
        assert_eq!(parsed.reply_count, Some(2));
        assert!(!parsed.is_reply());
        assert!(parsed.replies.is_none());
    }
}
