//! Explicitly constructed handle to every store, in place of process-wide
//! singletons.

use std::sync::Arc;

use community_hub_shared::{ContactMessage, Event, GalleryImage, Organizer, Registration};

use crate::{
    api::{ApiClient, CommentService, ResourceService},
    config::ClientConfig,
    error::ClientError,
    stores::{
        comments::{CommentStore, CommentStoreOptions},
        contact::{ContactForm, ContactInbox},
        moderation::ModerationView,
        replies::ReplyLoader,
        resource::ResourceStore,
    },
};

/// Owns the API client and one store per collection.
pub struct HubContext {
    config: ClientConfig,
    comments: Arc<CommentStore>,
    events: Arc<ResourceStore<Event>>,
    gallery: Arc<ResourceStore<GalleryImage>>,
    organizers: Arc<ResourceStore<Organizer>>,
    registrations: Arc<ResourceStore<Registration>>,
    contacts: Arc<ResourceStore<ContactMessage>>,
    contact_service: Arc<dyn ResourceService<ContactMessage>>,
}

impl HubContext {
    /// Context backed by the HTTP client described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(&config)?);
        tracing::info!("community hub client using {}", api.api_base());
        Ok(Self::with_api(config, api))
    }

    /// Context backed by any implementation of the service traits.
    pub fn with_api<S>(config: ClientConfig, api: Arc<S>) -> Self
    where
        S: CommentService
            + ResourceService<Event>
            + ResourceService<GalleryImage>
            + ResourceService<Organizer>
            + ResourceService<Registration>
            + ResourceService<ContactMessage>
            + 'static,
    {
        let page_size = config.page_size;
        let comment_service: Arc<dyn CommentService> = api.clone();
        let events: Arc<dyn ResourceService<Event>> = api.clone();
        let gallery: Arc<dyn ResourceService<GalleryImage>> = api.clone();
        let organizers: Arc<dyn ResourceService<Organizer>> = api.clone();
        let registrations: Arc<dyn ResourceService<Registration>> = api.clone();
        let contact_service: Arc<dyn ResourceService<ContactMessage>> = api;

        Self {
            comments: Arc::new(CommentStore::new(
                comment_service,
                CommentStoreOptions::from(&config),
            )),
            events: Arc::new(ResourceStore::new(events, page_size)),
            gallery: Arc::new(ResourceStore::new(gallery, page_size)),
            organizers: Arc::new(ResourceStore::new(organizers, page_size)),
            registrations: Arc::new(ResourceStore::new(registrations, page_size)),
            contacts: Arc::new(ResourceStore::new(contact_service.clone(), page_size)),
            contact_service,
            config,
        }
    }

    /// Configuration the context was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared comment store.
    pub fn comments(&self) -> &Arc<CommentStore> {
        &self.comments
    }

    /// Shared event store.
    pub fn events(&self) -> &Arc<ResourceStore<Event>> {
        &self.events
    }

    /// Shared gallery store.
    pub fn gallery(&self) -> &Arc<ResourceStore<GalleryImage>> {
        &self.gallery
    }

    /// Shared organizer store.
    pub fn organizers(&self) -> &Arc<ResourceStore<Organizer>> {
        &self.organizers
    }

    /// Shared registration store.
    pub fn registrations(&self) -> &Arc<ResourceStore<Registration>> {
        &self.registrations
    }

    /// Shared contact message store.
    pub fn contacts(&self) -> &Arc<ResourceStore<ContactMessage>> {
        &self.contacts
    }

    /// Reply loader over the comment store, using the configured display depth.
    pub fn reply_loader(&self) -> ReplyLoader {
        ReplyLoader::new(self.comments.clone()).with_display_depth(self.config.reply_display_depth)
    }

    /// Moderation view over the whole comment listing.
    pub fn moderation(&self) -> ModerationView {
        ModerationView::new(self.comments.clone())
    }

    /// Public contact form.
    pub fn contact_form(&self) -> ContactForm {
        ContactForm::new(self.contact_service.clone())
    }

    /// Admin inbox over the contact message store.
    pub fn contact_inbox(&self) -> ContactInbox {
        ContactInbox::new(self.contacts.clone())
    }

    /// Drop every held record, e.g. on sign-out. Fetches still in flight are
    /// discarded when they complete.
    pub fn reset(&self) {
        self.comments.reset();
        self.events.reset();
        self.gallery.reset();
        self.organizers.reset();
        self.registrations.reset();
        self.contacts.reset();
        tracing::debug!("community hub context reset");
    }
}
