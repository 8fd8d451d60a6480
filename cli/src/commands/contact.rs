//! `hub-cli contact`.

use anyhow::{Context, Result};
use chrono::Utc;
use community_hub_frontend::{ClientError, HubContext};
use community_hub_shared::{ContactSubmission, ListQuery};
use serde_json::json;

use super::print_json;
use crate::cli::ContactCommands;

/// Run one `contact` subcommand.
pub async fn run(hub: &HubContext, command: ContactCommands) -> Result<()> {
    let inbox = hub.contact_inbox();
    match command {
        ContactCommands::Inbox {
            unread,
        } => {
            inbox
                .fetch(ListQuery::default())
                .await
                .context("failed to fetch contact messages")?;
            let mut buckets = inbox.buckets(Utc::now());
            if unread {
                buckets.new.retain(|message| !message.is_read);
                buckets.past.retain(|message| !message.is_read);
            }
            print_json(&json!({
                "unread": inbox.unread_count(),
                "new": buckets.new,
                "past": buckets.past,
            }))
        },
        ContactCommands::MarkRead {
            id,
        } => {
            let message = inbox.mark_read(&id).await?;
            print_json(&message)
        },
        ContactCommands::Delete {
            id,
        } => {
            inbox.delete(&id).await?;
            print_json(&json!({ "deleted": id }))
        },
        ContactCommands::Send {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let submission = ContactSubmission {
                name,
                email,
                phone,
                subject,
                message,
            };
            match hub.contact_form().submit(&submission).await {
                Ok(sent) => print_json(&sent),
                Err(ClientError::Validation(errors)) => {
                    for (field, message) in errors.iter() {
                        eprintln!("{field}: {message}");
                    }
                    Err(ClientError::Validation(errors).into())
                },
                Err(err) => Err(err.into()),
            }
        },
    }
}
