//! `hub-cli comments`.

use anyhow::{bail, Context, Result};
use community_hub_frontend::{HubContext, ModerationView, ReplyLoader};
use community_hub_shared::{CommentQuery, NewComment, ParentFilter};
use serde_json::json;

use super::print_json;
use crate::cli::CommentCommands;

/// Run one `comments` subcommand.
pub async fn run(hub: &HubContext, command: CommentCommands) -> Result<()> {
    match command {
        CommentCommands::List {
            status,
            page,
            limit,
            event_id,
            top_level,
        } => {
            let query = CommentQuery {
                page,
                limit: limit.or(Some(hub.config().page_size)),
                approved: None,
                event_id,
                parent: if top_level {
                    ParentFilter::TopLevel
                } else {
                    ParentFilter::Any
                },
            };
            let view =
                ModerationView::with_query(hub.comments().clone(), query).with_filter(status);
            view.refresh().await.context("failed to fetch comments")?;

            let counts = view.counts();
            let state = hub.comments().snapshot();
            print_json(&json!({
                "filter": status.as_str(),
                "comments": view.visible(),
                "counts": {
                    "all": counts.all,
                    "pending": counts.pending,
                    "approved": counts.approved,
                },
                "pagination": state.pagination,
            }))
        },
        CommentCommands::Approve {
            id,
        } => {
            let comment = hub.comments().approve(&id).await?;
            print_json(&comment)
        },
        CommentCommands::Reject {
            id,
        } => {
            let comment = hub.comments().reject(&id).await?;
            print_json(&comment)
        },
        CommentCommands::Delete {
            id,
            yes,
        } => {
            let mut view = hub.moderation();
            view.request_delete(&id);
            if !yes {
                view.cancel_delete();
                bail!("comment {id} was not deleted; re-run with --yes to confirm");
            }
            let deleted = view.confirm_delete().await?;
            print_json(&json!({ "deleted": deleted }))
        },
        CommentCommands::Replies {
            id,
            depth,
        } => {
            let depth = depth.unwrap_or(hub.config().reply_display_depth).max(1);
            let loader = ReplyLoader::new(hub.comments().clone()).with_display_depth(depth);
            load_thread(&loader, &id, depth).await?;

            let state = hub.comments().snapshot();
            let replies: Vec<_> = loader
                .replies(&id)
                .iter()
                .filter_map(|reply| state.thread(&reply.id, depth - 1))
                .collect();
            print_json(&json!({
                "parentId": id,
                "replies": replies,
            }))
        },
        CommentCommands::Create {
            content,
            author_name,
            author_email,
            event_id,
            parent_id,
        } => {
            let comment = NewComment {
                content,
                author_name,
                author_email,
                event_id,
                parent_id,
            };
            let created = hub.comments().create_comment(comment).await?;
            eprintln!("comment {} is awaiting approval", created.id);
            print_json(&created)
        },
    }
}

/// Load every reply set down to `depth` levels below `root`.
async fn load_thread(loader: &ReplyLoader, root: &str, depth: usize) -> Result<()> {
    let mut frontier = vec![(root.to_string(), 0usize)];
    while let Some((parent, level)) = frontier.pop() {
        if level >= depth {
            continue;
        }
        let replies = loader
            .refresh(&parent)
            .await
            .with_context(|| format!("failed to load replies of {parent}"))?;
        frontier.extend(
            replies
                .into_iter()
                .filter(|reply| reply.reply_count.unwrap_or(1) > 0)
                .map(|reply| (reply.id, level + 1)),
        );
    }
    Ok(())
}
