//! Read-only listings of events, gallery, organizers and registrations.

use anyhow::{Context, Result};
use chrono::Utc;
use community_hub_frontend::{
    stores::resource::{
        gallery_categories, gallery_in_category, organizers_in_display_order, registrations_for,
        split_events,
    },
    HubContext,
};
use community_hub_shared::{ListQuery, RegistrationStatus};
use serde_json::json;

use super::print_json;
use crate::cli::EventWindow;

fn paged(page: Option<u32>, limit: Option<u32>) -> ListQuery {
    ListQuery {
        page,
        limit,
        ..ListQuery::default()
    }
}

/// Print events, split around now.
pub async fn events(
    hub: &HubContext,
    page: Option<u32>,
    limit: Option<u32>,
    window: EventWindow,
) -> Result<()> {
    let store = hub.events();
    store
        .fetch(paged(page, limit))
        .await
        .context("failed to fetch events")?;

    let timeline = split_events(&store.items(), Utc::now());
    let pagination = store.snapshot().pagination;
    match window {
        EventWindow::All => print_json(&json!({
            "upcoming": timeline.upcoming,
            "past": timeline.past,
            "pagination": pagination,
        })),
        EventWindow::Upcoming => print_json(&json!({
            "events": timeline.upcoming,
            "pagination": pagination,
        })),
        EventWindow::Past => print_json(&json!({
            "events": timeline.past,
            "pagination": pagination,
        })),
    }
}

/// Print gallery images and the categories present.
pub async fn gallery(hub: &HubContext, category: Option<&str>, page: Option<u32>) -> Result<()> {
    let store = hub.gallery();
    store
        .fetch(paged(page, None))
        .await
        .context("failed to fetch gallery")?;

    let images = store.items();
    print_json(&json!({
        "categories": gallery_categories(&images),
        "images": gallery_in_category(&images, category),
        "pagination": store.snapshot().pagination,
    }))
}

/// Print organizers in display order.
pub async fn organizers(hub: &HubContext) -> Result<()> {
    let store = hub.organizers();
    store
        .fetch(ListQuery::default())
        .await
        .context("failed to fetch organizers")?;
    print_json(&json!({
        "organizers": organizers_in_display_order(&store.items()),
    }))
}

/// Print registrations, optionally for one event and status.
pub async fn registrations(
    hub: &HubContext,
    event_id: Option<&str>,
    status: Option<RegistrationStatus>,
) -> Result<()> {
    let mut query = ListQuery::default();
    if let Some(event_id) = event_id {
        query = query.filter("eventId", event_id);
    }
    if let Some(status) = status {
        query = query.filter("status", status.as_str());
    }

    let store = hub.registrations();
    store
        .fetch(query)
        .await
        .context("failed to fetch registrations")?;

    let held = store.items();
    let registrations = match event_id {
        Some(event_id) => registrations_for(&held, event_id, status),
        None => held
            .into_iter()
            .filter(|registration| status.is_none() || status == Some(registration.status))
            .collect(),
    };
    print_json(&json!({
        "total": registrations.len(),
        "registrations": registrations,
    }))
}
