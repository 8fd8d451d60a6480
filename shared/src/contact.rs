//! Inbox grouping for contact form messages.

use chrono::{DateTime, Duration, Utc};

use crate::resources::ContactMessage;

/// Messages younger than this are shown in the inbox's "new" tab.
pub const NEW_MESSAGE_WINDOW_DAYS: i64 = 7;

/// Contact messages split by age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactBuckets {
    /// Received within the window.
    pub new: Vec<ContactMessage>,
    /// Everything older.
    pub past: Vec<ContactMessage>,
}

impl ContactBuckets {
    /// Unread messages across both buckets.
    pub fn unread(&self) -> usize {
        self.new
            .iter()
            .chain(self.past.iter())
            .filter(|message| !message.is_read)
            .count()
    }
}

/// Split messages into "new" (received within the last seven days, boundary
/// included) and "past". Both buckets are ordered newest first.
pub fn partition_by_age(messages: &[ContactMessage], now: DateTime<Utc>) -> ContactBuckets {
    let threshold = now - Duration::days(NEW_MESSAGE_WINDOW_DAYS);
    let (mut new, mut past): (Vec<_>, Vec<_>) = messages
        .iter()
        .cloned()
        .partition(|message| message.created_at >= threshold);
    new.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    past.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ContactBuckets {
        new,
        past,
    }
}
