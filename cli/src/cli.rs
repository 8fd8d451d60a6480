//! Command-line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use community_hub_frontend::ModerationFilter;
use community_hub_shared::RegistrationStatus;

/// Top-level arguments of `hub-cli`.
#[derive(Parser)]
#[command(name = "hub-cli", version, about = "Community hub admin CLI")]
pub struct Cli {
    /// API connection overrides, accepted by every command.
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for `COMMUNITY_HUB_API_BASE` / `COMMUNITY_HUB_API_TOKEN`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// API base URL including the `/api` prefix.
    #[arg(long, global = true)]
    pub api_base: Option<String>,
    /// Bearer token for admin endpoints.
    #[arg(long, global = true)]
    pub token: Option<String>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Moderate comments.
    Comments {
        /// Comment action.
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// GET /api/events
    Events {
        /// Page number (1-based).
        #[arg(long)]
        page: Option<u32>,
        /// Page size.
        #[arg(long)]
        limit: Option<u32>,
        /// Which side of now to show.
        #[arg(long, value_enum, default_value_t = EventWindow::All, ignore_case = true)]
        window: EventWindow,
    },
    /// GET /api/gallery
    Gallery {
        /// Only images in this category.
        #[arg(long)]
        category: Option<String>,
        /// Page number (1-based).
        #[arg(long)]
        page: Option<u32>,
    },
    /// GET /api/organizers, in display order.
    Organizers,
    /// GET /api/registrations
    Registrations {
        /// Only registrations for this event.
        #[arg(long)]
        event_id: Option<String>,
        /// Only registrations in this state.
        #[arg(long, value_enum, ignore_case = true)]
        status: Option<StatusArg>,
    },
    /// Contact messages.
    Contact {
        /// Inbox action.
        #[command(subcommand)]
        command: ContactCommands,
    },
}

/// Comment moderation commands.
#[derive(Subcommand)]
pub enum CommentCommands {
    /// GET /api/comments, filtered by moderation status.
    List {
        /// `all`, `pending` or `approved`.
        #[arg(long, default_value = "all")]
        status: ModerationFilter,
        /// Page number (1-based).
        #[arg(long)]
        page: Option<u32>,
        /// Page size.
        #[arg(long)]
        limit: Option<u32>,
        /// Only comments on this event.
        #[arg(long)]
        event_id: Option<String>,
        /// Only top-level comments (sends `parentId=null`).
        #[arg(long)]
        top_level: bool,
    },
    /// PUT /api/comments/:id {isApproved: true}
    Approve {
        /// Comment id.
        id: String,
    },
    /// PUT /api/comments/:id {isApproved: false}
    Reject {
        /// Comment id.
        id: String,
    },
    /// DELETE /api/comments/:id
    Delete {
        /// Comment id.
        id: String,
        /// Confirm the deletion; without it nothing is deleted.
        #[arg(long)]
        yes: bool,
    },
    /// GET /api/comments/:id/replies, printed as a nested thread.
    Replies {
        /// Parent comment id.
        id: String,
        /// Deepest reply level to load and print.
        #[arg(long)]
        depth: Option<usize>,
    },
    /// POST /api/comments
    Create {
        /// Comment text.
        #[arg(long)]
        content: String,
        /// Display name of the author.
        #[arg(long)]
        author_name: String,
        /// Author email (not shown publicly).
        #[arg(long)]
        author_email: String,
        /// Event the comment belongs to.
        #[arg(long)]
        event_id: Option<String>,
        /// Reply to this comment.
        #[arg(long)]
        parent_id: Option<String>,
    },
}

/// Contact form and inbox commands.
#[derive(Subcommand)]
pub enum ContactCommands {
    /// GET /api/contacts, split into new (last 7 days) and past.
    Inbox {
        /// Only unread messages.
        #[arg(long)]
        unread: bool,
    },
    /// PUT /api/contacts/:id {isRead: true}
    MarkRead {
        /// Message id.
        id: String,
    },
    /// DELETE /api/contacts/:id
    Delete {
        /// Message id.
        id: String,
    },
    /// POST /api/contacts
    Send {
        /// Sender name.
        #[arg(long)]
        name: String,
        /// Reply address.
        #[arg(long)]
        email: String,
        /// Phone number (digits, spaces and +-() only).
        #[arg(long)]
        phone: Option<String>,
        /// Subject line.
        #[arg(long)]
        subject: String,
        /// Message body (at least 10 characters).
        #[arg(long)]
        message: String,
    },
}

/// Which events `hub-cli events` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventWindow {
    /// Upcoming and past, in separate lists.
    All,
    /// Events that have not ended yet.
    Upcoming,
    /// Events that have ended.
    Past,
}

/// Registration status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Awaiting confirmation.
    Pending,
    /// Seat confirmed.
    Confirmed,
    /// Withdrawn.
    Cancelled,
}

impl From<StatusArg> for RegistrationStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => Self::Pending,
            StatusArg::Confirmed => Self::Confirmed,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}
