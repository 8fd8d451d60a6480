//! Contact form submission and the admin inbox.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use community_hub_shared::{
    contact::{partition_by_age, ContactBuckets},
    validation::validate_contact_submission,
    ContactMessage, ContactSubmission, ListQuery,
};
use serde_json::json;

use super::{resource::ResourceStore, FetchOutcome};
use crate::{api::ResourceService, error::ClientError};

/// Public contact form.
#[derive(Clone)]
pub struct ContactForm {
    service: Arc<dyn ResourceService<ContactMessage>>,
}

impl ContactForm {
    /// Form posting through `service`.
    pub fn new(service: Arc<dyn ResourceService<ContactMessage>>) -> Self {
        Self {
            service,
        }
    }

    /// Validate and send a message. Field errors reported by the server come
    /// back as [`ClientError::Validation`] so they can be shown next to the
    /// offending inputs.
    pub async fn submit(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactMessage, ClientError> {
        validate_contact_submission(submission)?;
        let body = serde_json::to_value(submission)
            .map_err(|err| ClientError::Serialize(err.to_string()))?;
        match self.service.create(&body).await {
            Ok(message) => {
                tracing::info!("contact message {} received", message.id);
                Ok(message)
            },
            Err(ClientError::Application {
                field_errors, ..
            }) if !field_errors.is_empty() => Err(ClientError::Validation(field_errors)),
            Err(err) => Err(err),
        }
    }
}

/// Admin view of received contact messages.
pub struct ContactInbox {
    store: Arc<ResourceStore<ContactMessage>>,
}

impl ContactInbox {
    /// Inbox over `store`.
    pub fn new(store: Arc<ResourceStore<ContactMessage>>) -> Self {
        Self {
            store,
        }
    }

    /// Underlying resource store.
    pub fn store(&self) -> &Arc<ResourceStore<ContactMessage>> {
        &self.store
    }

    /// Load messages; see [`ResourceStore::fetch`].
    pub async fn fetch(&self, query: ListQuery) -> Result<FetchOutcome, ClientError> {
        self.store.fetch(query).await
    }

    /// Held messages split into "new" and "past" relative to `now`.
    pub fn buckets(&self, now: DateTime<Utc>) -> ContactBuckets {
        partition_by_age(&self.store.items(), now)
    }

    /// Unread messages among those held.
    pub fn unread_count(&self) -> usize {
        self.store
            .items()
            .iter()
            .filter(|message| !message.is_read)
            .count()
    }

    /// Mark a message as read; the held copy is replaced on success.
    pub async fn mark_read(&self, id: &str) -> Result<ContactMessage, ClientError> {
        self.store.update(id, &json!({ "isRead": true })).await
    }

    /// Delete a message permanently.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.store.delete(id).await
    }
}
