//! Records of the non-comment REST collections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// A REST collection exposed as `/{PATH}` and `/{PATH}/:id`.
///
/// List responses carry the records under `COLLECTION_KEY`, single-record
/// responses under `ITEM_KEY`.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Path segment below the API base.
    const PATH: &'static str;
    /// Key of the record list in list responses.
    const COLLECTION_KEY: &'static str;
    /// Key of the record in single-record responses.
    const ITEM_KEY: &'static str;

    /// Normalized `_id`.
    fn id(&self) -> &str;
}

/// Generic list parameters for non-comment resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Extra `key=value` filters passed through verbatim.
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
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

    /// Add a `key=value` filter, replacing an earlier value for `key`.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Whether `record` satisfies every filter. Each filter is compared with
    /// the record's wire field of the same name; a filter naming a field the
    /// record does not carry never matches.
    pub fn matches<R: Serialize>(&self, record: &R) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let fields = match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => fields,
            _ => return false,
        };
        self.filters
            .iter()
            .all(|(key, expected)| match fields.get(key) {
                Some(Value::String(actual)) => actual == expected,
                Some(Value::Bool(actual)) => actual.to_string() == *expected,
                Some(Value::Number(actual)) => actual.to_string() == *expected,
                _ => false,
            })
    }

    /// Paging parameters first, then filters ordered by key.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}

fn default_true() -> bool {
    true
}

/// A community event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Event title.
    pub title: String,
    /// Long description, may be empty.
    #[serde(default)]
    pub description: String,
    /// Start time.
    pub date: DateTime<Utc>,
    /// End time; open-ended events end when they start.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Venue.
    #[serde(default)]
    pub location: String,
    /// Cover image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Seat limit, if any.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Registrations so far.
    #[serde(default)]
    pub registration_count: u32,
    /// Hidden from the public site when false.
    #[serde(default = "default_true")]
    pub is_published: bool,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Time of the last edit.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// An event is upcoming until it ends; events without an end date end
    /// when they start.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end_date.unwrap_or(self.date) >= now
    }

    /// Free seats, or `None` without a capacity.
    pub fn seats_left(&self) -> Option<u32> {
        self.capacity
            .map(|capacity| capacity.saturating_sub(self.registration_count))
    }
}

impl Resource for Event {
    const PATH: &'static str = "events";
    const COLLECTION_KEY: &'static str = "events";
    const ITEM_KEY: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A photo in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    /// Identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Caption title.
    pub title: String,
    /// Image location.
    pub image_url: String,
    /// Caption text.
    #[serde(default)]
    pub description: Option<String>,
    /// Gallery tab the image is filed under.
    #[serde(default)]
    pub category: Option<String>,
    /// Event the photo was taken at.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Upload time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Time of the last edit.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for GalleryImage {
    const PATH: &'static str = "gallery";
    const COLLECTION_KEY: &'static str = "images";
    const ITEM_KEY: &'static str = "image";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A member of the organizing team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    /// Identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Full name.
    pub name: String,
    /// Role within the team.
    #[serde(default)]
    pub role: String,
    /// Short biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Portrait.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Public contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Profile links keyed by network name.
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    /// Display order on the organizers page, ascending.
    #[serde(default)]
    pub order: i32,
}

impl Resource for Organizer {
    const PATH: &'static str = "organizers";
    const COLLECTION_KEY: &'static str = "organizers";
    const ITEM_KEY: &'static str = "organizer";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Lifecycle of an event registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Awaiting confirmation.
    #[default]
    Pending,
    /// Seat confirmed.
    Confirmed,
    /// Withdrawn by the attendee or an admin.
    Cancelled,
}

impl RegistrationStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A sign-up for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Event signed up for.
    pub event_id: String,
    /// Attendee name.
    pub name: String,
    /// Attendee email.
    pub email: String,
    /// Attendee phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Current status.
    #[serde(default)]
    pub status: RegistrationStatus,
    /// Sign-up time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Time of the last status change.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Registration {
    const PATH: &'static str = "registrations";
    const COLLECTION_KEY: &'static str = "registrations";
    const ITEM_KEY: &'static str = "registration";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A message received through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// Identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Sender phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Set once an admin opened the message.
    #[serde(default)]
    pub is_read: bool,
    /// Receive time.
    pub created_at: DateTime<Utc>,
}

impl Resource for ContactMessage {
    const PATH: &'static str = "contacts";
    const COLLECTION_KEY: &'static str = "messages";
    const ITEM_KEY: &'static str = "message";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST /contacts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    /// Sender name, 2 to 100 characters.
    #[validate(custom(function = "crate::validation::contact_name"))]
    pub name: String,
    /// Reply address.
    #[validate(custom(function = "crate::validation::email_address"))]
    pub email: String,
    /// Digits, spaces and `+-()` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: Option<String>,
    /// Subject line, up to 200 characters.
    #[validate(custom(function = "crate::validation::contact_subject"))]
    pub subject: String,
    /// Message body, 10 to 5000 characters.
    #[validate(custom(function = "crate::validation::contact_message"))]
    pub message: String,
}
