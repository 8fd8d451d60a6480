//! Client layer of the community hub: a REST client that enforces the API
//! envelope, and observable stores for comments (with lazily loaded reply
//! threads and admin moderation), events, gallery images, organizers,
//! registrations and contact messages.
//!
//! ```no_run
//! use community_hub_frontend::{ClientConfig, HubContext};
//! use community_hub_shared::CommentQuery;
//!
//! # async fn demo() -> Result<(), community_hub_frontend::ClientError> {
//! let hub = HubContext::new(ClientConfig::from_env())?;
//! hub.comments().fetch_comments(CommentQuery::for_event("ev-1")).await?;
//! for comment in hub.comments().comments() {
//!     println!("{}: {}", comment.author_name, comment.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod stores;

pub use api::{ApiClient, CommentService, Page, ResourceService};
pub use config::ClientConfig;
pub use context::HubContext;
pub use error::ClientError;
pub use stores::{
    comments::{CommentState, CommentStore, CommentStoreOptions},
    contact::{ContactForm, ContactInbox},
    moderation::{ModerationCounts, ModerationFilter, ModerationView},
    replies::{build_thread, ReplyLoader, ReplyPhase, ReplyThread, ReplyToggle},
    resource::{ResourceState, ResourceStore},
    FetchOutcome,
};
