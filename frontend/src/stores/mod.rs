//! Client-side aggregate stores.
//!
//! A store owns the in-memory copy of one collection, mutates it only through
//! its own operations, and publishes every completed mutation as a single
//! state replacement on a `tokio::sync::watch` channel.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, PoisonError,
    },
};

pub mod comments;
pub mod contact;
pub mod moderation;
pub mod replies;
pub mod resource;

/// Result of a list fetch that completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the store.
    Applied,
    /// A newer fetch was issued while this one was in flight; its response
    /// was dropped.
    Superseded,
}

/// Sequence numbers for outgoing fetches. Only the latest ticket may write.
#[derive(Debug, Default)]
pub(crate) struct FetchFence {
    latest: AtomicU64,
}

impl FetchFence {
    pub(crate) fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::Acquire) == ticket
    }
}

/// One fence per key, for fetches that only race against fetches of the same
/// key (reply sets of one parent). Tickets come from a single counter, so a
/// ticket issued before [`KeyedFence::clear`] never becomes current again.
#[derive(Debug, Default)]
pub(crate) struct KeyedFence {
    next: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

impl KeyedFence {
    pub(crate) fn issue(&self, key: &str) -> u64 {
        let ticket = self.next.fetch_add(1, Ordering::AcqRel) + 1;
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), ticket);
        ticket
    }

    pub(crate) fn is_current(&self, key: &str, ticket: u64) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            == Some(&ticket)
    }

    pub(crate) fn clear(&self) {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchFence, KeyedFence};

    #[test]
    fn only_latest_ticket_is_current() {
        let fence = FetchFence::default();
        let first = fence.issue();
        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
    }

    #[test]
    fn keyed_tickets_are_independent_per_key() {
        let fence = KeyedFence::default();
        let a1 = fence.issue("a");
        let b1 = fence.issue("b");
        let a2 = fence.issue("a");
        assert!(!fence.is_current("a", a1));
        assert!(fence.is_current("a", a2));
        assert!(fence.is_current("b", b1));

        fence.clear();
        assert!(!fence.is_current("a", a2));
        assert!(!fence.is_current("b", b1));
    }
}
