//! In-memory doubles for the persistence, image and mail ports

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::error::{DatabaseError, DatabaseResult};
use uuid::Uuid;

use crate::{
    images::{ImageError, ImageStore},
    mailer::{MailError, Mailer, OutgoingEmail},
    models::{
        Event, EventPatch, EventType, Gift, GiftPatch, ImageUpload, NewEvent, NewGift, NewRsvp,
        NewUser, ProfilePatch, Rsvp, RsvpCounts, RsvpStatus, User,
    },
    notifications::{Notification, Notifier, NotifyError},
    repositories::{EventStore, GiftStore, RsvpStore, UserStore, constraints},
    services::{AuthService, EventService, GiftService, RsvpService},
    state::AppState,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    gifts: Vec<Gift>,
    rsvps: Vec<Rsvp>,
}

/// Store implementing every persistence trait, with the same unique and
/// cascade rules as the schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn violation(constraint: &str) -> DatabaseError {
    DatabaseError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

impl MemoryStore {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn user_count(&self) -> usize {
        self.tables().users.len()
    }

    pub fn rsvp_count(&self) -> usize {
        self.tables().rsvps.len()
    }

    fn has_gift_with_image(&self, url: &str) -> bool {
        self.tables()
            .gifts
            .iter()
            .any(|g| g.image.as_deref() == Some(url))
    }

    pub fn gift(&self, id: Uuid) -> Option<Gift> {
        self.tables().gifts.iter().find(|g| g.id == id).cloned()
    }

    pub async fn insert_gift(&self, gift: NewGift) -> Gift {
        self.create_gift(&gift).await.unwrap()
    }

    pub fn force_rsvp_status(&self, id: Uuid, status: RsvpStatus) {
        if let Some(rsvp) = self.tables().rsvps.iter_mut().find(|r| r.id == id) {
            rsvp.status = status;
        }
    }

    fn events_where(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .tables()
            .events
            .iter()
            .filter(|&e| keep(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.date, e.created_at));
        events
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> DatabaseResult<User> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(violation(constraints::USERS_USERNAME));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(violation(constraints::USERS_EMAIL));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            name: None,
            location: None,
            image: None,
            social_links: None,
            is_organizer: user.is_organizer,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        Ok(self.tables().users.iter().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> DatabaseResult<bool> {
        Ok(self.tables().users.iter().any(|u| u.username == username))
    }

    async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> DatabaseResult<Option<User>> {
        let mut tables = self.tables();
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(location) = &patch.location {
            user.location = location.clone();
        }
        if let Some(image) = &patch.image {
            user.image = image.clone();
        }
        if let Some(links) = &patch.social_links {
            user.social_links = links.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_organizer(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let mut tables = self.tables();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.is_organizer = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, event: &NewEvent) -> DatabaseResult<Event> {
        let mut tables = self.tables();
        if tables.events.iter().any(|e| e.event_key == event.event_key) {
            return Err(violation(constraints::EVENTS_EVENT_KEY));
        }
        if tables
            .events
            .iter()
            .any(|e| e.name == event.name && e.creator_id == event.creator_id)
        {
            return Err(violation(constraints::EVENTS_NAME_CREATOR));
        }

        let now = Utc::now();
        let created = Event {
            id: Uuid::new_v4(),
            name: event.name.clone(),
            date: event.date,
            event_key: event.event_key.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            event_type: event.event_type,
            creator_id: event.creator_id,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(created.clone());
        Ok(created)
    }

    async fn find_event(&self, id: Uuid) -> DatabaseResult<Option<Event>> {
        Ok(self.tables().events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_event_by_key(&self, event_key: &str) -> DatabaseResult<Option<Event>> {
        Ok(self
            .tables()
            .events
            .iter()
            .find(|e| e.event_key == event_key)
            .cloned())
    }

    async fn event_name_taken(
        &self,
        name: &str,
        creator_id: Uuid,
        excluding: Option<Uuid>,
    ) -> DatabaseResult<bool> {
        Ok(self.tables().events.iter().any(|e| {
            e.name == name && e.creator_id == creator_id && Some(e.id) != excluding
        }))
    }

    async fn list_events(&self) -> DatabaseResult<Vec<Event>> {
        Ok(self.events_where(|_| true))
    }

    async fn list_events_by_creator(&self, creator_id: Uuid) -> DatabaseResult<Vec<Event>> {
        Ok(self.events_where(|e| e.creator_id == creator_id))
    }

    async fn list_events_by_type(&self, event_type: EventType) -> DatabaseResult<Vec<Event>> {
        Ok(self.events_where(|e| e.event_type == event_type))
    }

    async fn list_events_after(&self, date: NaiveDate) -> DatabaseResult<Vec<Event>> {
        Ok(self.events_where(|e| e.date > date))
    }

    async fn search_events(&self, query: &str) -> DatabaseResult<Vec<Event>> {
        let query = query.to_lowercase();
        Ok(self.events_where(|e| {
            e.name.to_lowercase().contains(&query) || e.description.to_lowercase().contains(&query)
        }))
    }

    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> DatabaseResult<Option<Event>> {
        let mut tables = self.tables();
        let Some(event) = tables.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            event.name = name.clone();
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(description) = &patch.description {
            event.description = description.clone();
        }
        if let Some(location) = &patch.location {
            event.location = Some(location.clone());
        }
        if let Some(event_type) = patch.event_type {
            event.event_type = event_type;
        }
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut tables = self.tables();
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        tables.gifts.retain(|g| g.event_id != Some(id));
        tables.rsvps.retain(|r| r.event_id != id);
        Ok(tables.events.len() < before)
    }
}

#[async_trait]
impl GiftStore for MemoryStore {
    async fn create_gift(&self, gift: &NewGift) -> DatabaseResult<Gift> {
        let now = Utc::now();
        let created = Gift {
            id: Uuid::new_v4(),
            name: gift.name.clone(),
            recipient: gift.recipient.clone(),
            price: gift.price,
            image: gift.image.clone(),
            product_url: gift.product_url.clone(),
            description: gift.description.clone(),
            store: gift.store.clone(),
            status: gift.status,
            event_id: gift.event_id,
            planned_by_id: gift.planned_by_id,
            created_at: now,
            updated_at: now,
        };
        self.tables().gifts.push(created.clone());
        Ok(created)
    }

    async fn find_gift(&self, id: Uuid) -> DatabaseResult<Option<Gift>> {
        Ok(self.gift(id))
    }

    async fn list_gifts(&self) -> DatabaseResult<Vec<Gift>> {
        Ok(self.tables().gifts.clone())
    }

    async fn list_gifts_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Gift>> {
        Ok(self
            .tables()
            .gifts
            .iter()
            .filter(|g| g.event_id == Some(event_id))
            .cloned()
            .collect())
    }

    async fn update_gift(&self, id: Uuid, patch: &GiftPatch) -> DatabaseResult<Option<Gift>> {
        let mut tables = self.tables();
        let Some(gift) = tables.gifts.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            gift.name = name.clone();
        }
        if let Some(recipient) = &patch.recipient {
            gift.recipient = recipient.clone();
        }
        if let Some(price) = patch.price {
            gift.price = price;
        }
        if let Some(description) = &patch.description {
            gift.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            gift.status = status;
        }
        if let Some(image) = &patch.image {
            gift.image = Some(image.clone());
        }
        gift.updated_at = Utc::now();
        Ok(Some(gift.clone()))
    }

    async fn delete_gift(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut tables = self.tables();
        let before = tables.gifts.len();
        tables.gifts.retain(|g| g.id != id);
        Ok(tables.gifts.len() < before)
    }
}

#[async_trait]
impl RsvpStore for MemoryStore {
    async fn create_rsvp(&self, rsvp: &NewRsvp) -> DatabaseResult<Rsvp> {
        let created = Rsvp {
            id: Uuid::new_v4(),
            guest_email: rsvp.guest_email.clone(),
            status: RsvpStatus::Pending,
            event_id: rsvp.event_id,
            responded_at: None,
            created_at: Utc::now(),
        };
        self.tables().rsvps.push(created.clone());
        Ok(created)
    }

    async fn find_rsvp(&self, id: Uuid) -> DatabaseResult<Option<Rsvp>> {
        Ok(self.tables().rsvps.iter().find(|r| r.id == id).cloned())
    }

    async fn list_rsvps_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Rsvp>> {
        Ok(self
            .tables()
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn count_rsvps_by_status(&self, event_id: Uuid) -> DatabaseResult<RsvpCounts> {
        let mut counts = RsvpCounts::default();
        for rsvp in self.tables().rsvps.iter().filter(|r| r.event_id == event_id) {
            counts.add(rsvp.status, 1);
        }
        Ok(counts)
    }

    async fn set_rsvp_status(
        &self,
        id: Uuid,
        status: RsvpStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Option<Rsvp>> {
        let mut tables = self.tables();
        Ok(tables.rsvps.iter_mut().find(|r| r.id == id).map(|rsvp| {
            rsvp.status = status;
            if responded_at.is_some() {
                rsvp.responded_at = responded_at;
            }
            rsvp.clone()
        }))
    }
}

/// Image store that records calls instead of talking to S3
#[derive(Default)]
pub struct RecordingImages {
    uploads: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    rows_at_delete: Mutex<Vec<bool>>,
    store: Mutex<Option<Arc<MemoryStore>>>,
    fail_uploads: bool,
    refuse_deletes: bool,
}

impl RecordingImages {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn refusing_deletes() -> Self {
        Self {
            refuse_deletes: true,
            ..Default::default()
        }
    }

    pub fn uploaded(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Watch `store` so each delete records whether a gift row still
    /// referenced the image at that moment
    pub fn observe(&self, store: Arc<MemoryStore>) {
        *self.store.lock().unwrap() = Some(store);
    }

    /// One entry per delete, in call order
    pub fn rows_at_delete(&self) -> Vec<bool> {
        self.rows_at_delete.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImages {
    async fn upload(&self, image: &ImageUpload) -> Result<String, ImageError> {
        if image.is_empty() {
            return Err(ImageError::Empty);
        }
        if self.fail_uploads {
            return Err(ImageError::Provider("bucket unavailable".to_string()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://images.test/gift-registry/{}", n))
    }

    async fn delete(&self, url: Option<&str>) -> bool {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return true;
        };
        let store = self.store.lock().unwrap().clone();
        if let Some(store) = store {
            let present = store.has_gift_with_image(url);
            self.rows_at_delete.lock().unwrap().push(present);
        }
        self.deleted.lock().unwrap().push(url.to_string());
        !self.refuse_deletes
    }
}

/// Notifier that keeps what it was given
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().insert(recipient.to_string());
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.failing.lock().unwrap().contains(notification.recipient()) {
            return Err(NotifyError);
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Mailer that records recipients and can be told to fail for some
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl RecordingMailer {
    pub fn failing_for(recipient: &str) -> Self {
        Self {
            failing: HashSet::from([recipient.to_string()]),
            ..Default::default()
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.failing.contains(&email.to) {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.to.clone());
        Ok(())
    }
}

/// Services wired to in-memory doubles
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub auth: AuthService,
    pub events: EventService,
    pub gifts: GiftService,
    pub rsvps: RsvpService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_images(Arc::new(RecordingImages::default()))
    }

    pub fn with_images(images: Arc<RecordingImages>) -> Self {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        images.observe(store.clone());

        Self {
            auth: AuthService::new(store.clone()),
            events: EventService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                images.clone(),
                notifier.clone(),
            ),
            gifts: GiftService::new(store.clone(), store.clone(), store.clone(), images),
            rsvps: RsvpService::new(store.clone()),
            store,
            notifier,
        }
    }

    /// Insert a user called `username` with email `<username>@x.com`
    pub async fn user(&self, username: &str) -> User {
        self.store
            .create_user(&NewUser {
                username: username.to_string(),
                email: format!("{}@x.com", username),
                password_hash: "not-a-hash".to_string(),
                is_organizer: false,
            })
            .await
            .unwrap()
    }

    pub fn state(&self) -> AppState {
        AppState {
            auth: self.auth.clone(),
            events: self.events.clone(),
            gifts: self.gifts.clone(),
            rsvps: self.rsvps.clone(),
        }
    }
}

/// Lookup table from email to the RSVP ids created for it
pub fn rsvp_ids_by_email(store: &MemoryStore) -> HashMap<String, Vec<Uuid>> {
    let mut ids: HashMap<String, Vec<Uuid>> = HashMap::new();
    for rsvp in &store.tables().rsvps {
        ids.entry(rsvp.guest_email.clone()).or_default().push(rsvp.id);
    }
    ids
}
