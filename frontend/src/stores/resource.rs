//! Generic aggregate store for the non-comment collections, plus the derived
//! views their pages render.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use community_hub_shared::{
    Event, GalleryImage, ListQuery, Organizer, Pagination, Registration, RegistrationStatus,
    Resource,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use super::{FetchFence, FetchOutcome};
use crate::{api::ResourceService, error::ClientError};

/// State of one resource store, published as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<R> {
    /// The held listing, in server order.
    pub items: Vec<R>,
    /// Last record loaded through [`ResourceStore::fetch_one`].
    pub selected: Option<R>,
    /// Pagination of the held listing.
    pub pagination: Pagination,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch.
    pub error: Option<String>,
    /// Query of the held listing.
    pub query: ListQuery,
}

impl<R> Default for ResourceState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            pagination: Pagination::default(),
            loading: false,
            error: None,
            query: ListQuery::default(),
        }
    }
}

impl<R: Resource> ResourceState<R> {
    /// Held record with id `id`.
    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn replace(&mut self, record: R) -> bool {
        let mut replaced = false;
        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == record.id()) {
            *slot = record.clone();
            replaced = true;
        }
        if let Some(selected) = self.selected.as_mut().filter(|item| item.id() == record.id()) {
            *selected = record;
            replaced = true;
        }
        replaced
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.selected.as_ref().is_some_and(|item| item.id() == id) {
            self.selected = None;
        }
        self.items.len() != before
    }
}

/// Aggregate store over one REST collection.
pub struct ResourceStore<R: Resource> {
    service: Arc<dyn ResourceService<R>>,
    state: watch::Sender<ResourceState<R>>,
    fence: FetchFence,
    page_size: u32,
}

impl<R: Resource> ResourceStore<R> {
    /// Empty store over `service`.
    pub fn new(service: Arc<dyn ResourceService<R>>, page_size: u32) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            service,
            state,
            fence: FetchFence::default(),
            page_size: page_size.max(1),
        }
    }

    /// Observe every completed mutation.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<R>> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResourceState<R> {
        self.state.borrow().clone()
    }

    /// The held listing.
    pub fn items(&self) -> Vec<R> {
        self.state.borrow().items.clone()
    }

    /// Replace the held listing. Same failure and ordering rules as the
    /// comment store.
    pub async fn fetch(&self, query: ListQuery) -> Result<FetchOutcome, ClientError> {
        let ticket = self.fence.issue();
        self.state.send_modify(|state| state.loading = true);
        let result = self.service.list(&query).await;

        if !self.fence.is_current(ticket) {
            tracing::debug!("dropping superseded {} fetch #{ticket}", R::PATH);
            return result.map(|_| FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                self.state.send_modify(|state| {
                    state.items = page.items;
                    state.pagination = page.pagination;
                    state.query = query;
                    state.loading = false;
                    state.error = None;
                });
                Ok(FetchOutcome::Applied)
            },
            Err(err) => {
                tracing::warn!("{} fetch failed: {err}", R::PATH);
                let message = err.user_message();
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(err)
            },
        }
    }

    /// Re-run the query of the held listing.
    pub async fn refresh(&self) -> Result<FetchOutcome, ClientError> {
        let query = self.state.borrow().query.clone();
        self.fetch(query).await
    }

    /// Load one record into `selected`, refreshing its held copy.
    pub async fn fetch_one(&self, id: &str) -> Result<R, ClientError> {
        let record = self.service.get(id).await?;
        let selected = record.clone();
        self.state.send_modify(|state| {
            state.replace(selected.clone());
            state.selected = Some(selected);
        });
        Ok(record)
    }

    /// Create a record and put it at the front of the held listing when it
    /// satisfies the listing's filters. A record outside the held query is
    /// only returned; it shows up once a matching query is fetched.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<R, ClientError> {
        let body = to_body(body)?;
        let created = self.service.create(&body).await?;
        tracing::info!("created {} {}", R::PATH, created.id());
        let inserted = created.clone();
        let page_size = self.page_size;
        self.state.send_if_modified(|state| {
            if !state.query.matches(&inserted) {
                tracing::debug!(
                    "created {} {} is outside the held listing",
                    R::PATH,
                    inserted.id()
                );
                return false;
            }
            state.items.insert(0, inserted);
            state.pagination.record_created(page_size);
            true
        });
        Ok(created)
    }

    /// Update a record; the held copy is replaced after the server confirms.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let body = to_body(body)?;
        let updated = self.service.update(id, &body).await?;
        tracing::info!("updated {} {id}", R::PATH);
        let applied = updated.clone();
        self.state.send_if_modified(|state| state.replace(applied));
        Ok(updated)
    }

    /// Delete a record; the held copy is removed after the server confirms.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.service.delete(id).await?;
        tracing::info!("deleted {} {id}", R::PATH);
        let page_size = self.page_size;
        self.state.send_if_modified(|state| {
            let removed = state.remove(id);
            if removed {
                state.pagination.record_removed(page_size);
            }
            removed
        });
        Ok(())
    }

    /// Drop held data and discard in-flight fetches.
    pub fn reset(&self) {
        self.fence.issue();
        self.state.send_replace(ResourceState::default());
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|err| ClientError::Serialize(err.to_string()))
}

/// Events split around a reference time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTimeline {
    /// Soonest first.
    pub upcoming: Vec<Event>,
    /// Most recent first.
    pub past: Vec<Event>,
}

/// Split `events` into upcoming and past relative to `now`.
pub fn split_events(events: &[Event], now: DateTime<Utc>) -> EventTimeline {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) =
        events.iter().cloned().partition(|event| event.is_upcoming(now));
    upcoming.sort_by_key(|event| event.date);
    past.sort_by(|a, b| b.date.cmp(&a.date));
    EventTimeline {
        upcoming,
        past,
    }
}

/// Registrations of `event_id`, optionally limited to one status.
pub fn registrations_for(
    registrations: &[Registration],
    event_id: &str,
    status: Option<RegistrationStatus>,
) -> Vec<Registration> {
    registrations
        .iter()
        .filter(|registration| registration.event_id == event_id)
        .filter(|registration| status.is_none() || status == Some(registration.status))
        .cloned()
        .collect()
}

/// Organizers by `order`, ties broken by name.
pub fn organizers_in_display_order(organizers: &[Organizer]) -> Vec<Organizer> {
    let mut sorted = organizers.to_vec();
    sorted.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    sorted
}

/// Images in `category`; `None` selects everything.
pub fn gallery_in_category(images: &[GalleryImage], category: Option<&str>) -> Vec<GalleryImage> {
    images
        .iter()
        .filter(|image| category.is_none() || image.category.as_deref() == category)
        .cloned()
        .collect()
}

/// Distinct categories, sorted.
pub fn gallery_categories(images: &[GalleryImage]) -> Vec<String> {
    images
        .iter()
        .filter_map(|image| image.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn event(id: &str, date: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            description: String::new(),
            date,
            end_date: None,
            location: "Hall".to_string(),
            image_url: None,
            capacity: None,
            registration_count: 0,
            is_published: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn organizer(name: &str, order: i32) -> Organizer {
        Organizer {
            id: name.to_lowercase(),
            name: name.to_string(),
            role: String::new(),
            bio: None,
            image_url: None,
            email: None,
            social_links: Default::default(),
            order,
        }
    }

    #[test]
    fn events_split_around_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single().expect("valid date");
        let events = vec![
            event("later", now + Duration::days(10)),
            event("yesterday", now - Duration::days(1)),
            event("soon", now + Duration::hours(3)),
            event("last-month", now - Duration::days(30)),
        ];

        let timeline = split_events(&events, now);
        let upcoming: Vec<_> = timeline.upcoming.iter().map(|e| e.id.as_str()).collect();
        let past: Vec<_> = timeline.past.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(upcoming, vec!["soon", "later"]);
        assert_eq!(past, vec!["yesterday", "last-month"]);
    }

    #[test]
    fn organizers_sort_by_order_then_name() {
        let sorted = organizers_in_display_order(&[
            organizer("Zoe", 1),
            organizer("Bea", 2),
            organizer("Al", 1),
        ]);
        let names: Vec<_> = sorted.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Al", "Zoe", "Bea"]);
    }

    #[test]
    fn state_replace_and_remove_work_by_id() {
        let now = Utc::now();
        let mut state = ResourceState::<Event>::default();
        state.items = vec![event("a", now), event("b", now)];
        state.selected = Some(event("b", now));

        let mut renamed = event("b", now);
        renamed.title = "Renamed".to_string();
        assert!(state.replace(renamed));
        assert_eq!(state.get("b").map(|e| e.title.as_str()), Some("Renamed"));
        assert_eq!(state.selected.as_ref().map(|e| e.title.as_str()), Some("Renamed"));

        assert!(!state.replace(event("zzz", now)));
        assert!(state.remove("b"));
        assert!(state.selected.is_none());
        assert!(!state.remove("b"));
        assert_eq!(state.items.len(), 1);
    }
}
