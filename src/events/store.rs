//! Event catalog store with file-based JSON persistence
//!
//! Directory layout:
//! ```text
//! <base_dir>/
//! └── events/
//!     ├── evt-<uuid>.json
//!     └── ...
//! ```
//!
//! The store is the backend behind both boundaries the core talks to: it is
//! the ordered event collection the filter engine reads, and it implements
//! [`EventService`] for the submission workflow.

use crate::error::{Error, Result};
use crate::events::filter::{visible_events, FilterSpec};
use crate::events::types::*;
use crate::submission::EventService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory event catalog backed by JSON files
pub struct EventStore {
    events_dir: PathBuf,
    events: Arc<RwLock<Vec<Event>>>,
}

impl EventStore {
    /// Create a new event store at the given base directory
    pub async fn new(base_dir: PathBuf) -> std::io::Result<Self> {
        let events_dir = base_dir.join("events");
        tokio::fs::create_dir_all(&events_dir).await?;

        let store = Self {
            events_dir,
            events: Arc::new(RwLock::new(Vec::new())),
        };

        store.load_from_disk().await;
        Ok(store)
    }

    /// Default base directory (<data-local>/campus-events/)
    pub fn default_dir() -> PathBuf {
        dirs_next::data_local_dir()
            .or_else(dirs_next::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("campus-events")
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the whole catalog in creation order
    pub async fn all(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    /// Events visible under `spec`, in creation order
    pub async fn list(&self, spec: &FilterSpec) -> Vec<Event> {
        let events = self.events.read().await;
        visible_events(&events, spec).into_iter().cloned().collect()
    }

    /// Get a single event by ID
    pub async fn get(&self, id: &str) -> Option<Event> {
        let events = self.events.read().await;
        events.iter().find(|e| e.id == id).cloned()
    }

    /// Aggregate statistics over the whole catalog
    pub async fn stats(&self) -> EventStats {
        let events = self.events.read().await;
        compute_stats(&events)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a new draft event (id and creation time are server-generated)
    pub async fn create(&self, candidate: NewEvent) -> Result<Event> {
        if candidate.capacity == 0 {
            return Err(Error::Validation(
                "capacity must be a positive integer".to_string(),
            ));
        }
        if candidate.status != EventStatus::Draft {
            return Err(Error::Validation(format!(
                "new events must start as draft, got {}",
                candidate.status
            )));
        }
        for (field, value) in [
            ("title", &candidate.title),
            ("description", &candidate.description),
            ("location", &candidate.location),
            ("organizer.id", &candidate.organizer.id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("{} must not be empty", field)));
            }
        }

        let event = Event {
            id: format!("evt-{}", uuid::Uuid::new_v4()),
            title: candidate.title,
            description: candidate.description,
            date: candidate.date,
            time: candidate.time,
            location: candidate.location,
            category: candidate.category,
            capacity: candidate.capacity,
            price: candidate.price,
            image_url: candidate.image_url,
            status: EventStatus::Draft,
            registrations: 0,
            organizer: candidate.organizer,
            created_at: chrono::Utc::now(),
        };

        self.events.write().await.push(event.clone());

        tracing::info!(
            id = %event.id,
            title = %event.title,
            organizer = %event.organizer.id,
            "Created draft event"
        );
        self.persist_event(&event).await;
        Ok(event)
    }

    /// Move an event forward in its lifecycle (approval, start, completion)
    pub async fn advance_status(&self, id: &str, status: EventStatus) -> Result<Event> {
        let event = {
            let mut events = self.events.write().await;
            let event = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| Error::NotFound(format!("Event {} not found", id)))?;

            if !event.status.can_advance_to(status) {
                return Err(Error::InvalidState(format!(
                    "cannot move event {} from {} to {}",
                    id, event.status, status
                )));
            }
            event.status = status;
            event.clone()
        };

        tracing::info!(id = %event.id, status = %event.status, "Advanced event status");
        self.persist_event(&event).await;
        Ok(event)
    }

    /// Record `seats` new registrations, never exceeding capacity
    pub async fn register(&self, id: &str, seats: u32) -> Result<Event> {
        if seats == 0 {
            return Err(Error::Validation("seats must be at least 1".to_string()));
        }

        let event = {
            let mut events = self.events.write().await;
            let event = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| Error::NotFound(format!("Event {} not found", id)))?;

            if !event.status.accepts_registrations() {
                return Err(Error::InvalidState(format!(
                    "event {} is {} and does not accept registrations",
                    id, event.status
                )));
            }
            if seats > event.seats_left() {
                return Err(Error::InvalidState(format!(
                    "event {} has {} seats left, requested {}",
                    id,
                    event.seats_left(),
                    seats
                )));
            }
            event.registrations += seats;
            event.clone()
        };

        tracing::debug!(
            id = %event.id,
            registrations = event.registrations,
            capacity = event.capacity,
            "Recorded registrations"
        );
        self.persist_event(&event).await;
        Ok(event)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load all events from disk
    async fn load_from_disk(&self) {
        let mut events = Self::load_json_files::<Event>(&self.events_dir);
        events.retain(|event| {
            let sane = event.capacity > 0 && event.registrations <= event.capacity;
            if !sane {
                tracing::warn!(
                    id = %event.id,
                    registrations = event.registrations,
                    capacity = event.capacity,
                    "Skipping stored event with invalid capacity"
                );
            }
            sane
        });
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        tracing::debug!(count = events.len(), "Loaded event catalog");
        *self.events.write().await = events;
    }

    /// Load all JSON files from a directory into a Vec
    fn load_json_files<T: serde::de::DeserializeOwned>(dir: &Path) -> Vec<T> {
        let mut items = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                return items;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        items
    }

    /// Persist a single event to disk. Failures are logged, the in-memory
    /// catalog stays authoritative.
    async fn persist_event(&self, event: &Event) {
        let path = self.events_dir.join(format!("{}.json", event.id));
        match serde_json::to_string_pretty(event) {
            Ok(json) => {
                if let Err(e) = tokio::fs::write(&path, json).await {
                    tracing::warn!("Failed to persist event {}: {}", event.id, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize event {}: {}", event.id, e);
            }
        }
    }
}

#[async_trait::async_trait]
impl EventService for EventStore {
    async fn create_event(&self, candidate: NewEvent) -> Result<Event> {
        self.create(candidate).await
    }
}

/// Dashboard and report figures over a slice of events
pub fn compute_stats(events: &[Event]) -> EventStats {
    let mut stats = EventStats::default();

    for event in events {
        match event.status {
            EventStatus::Draft => stats.by_status.draft += 1,
            EventStatus::Upcoming => stats.by_status.upcoming += 1,
            EventStatus::Ongoing => stats.by_status.ongoing += 1,
            EventStatus::Completed => stats.by_status.completed += 1,
        }
        *stats.by_category.entry(event.category).or_insert(0) += 1;
        stats.total_registrations += u64::from(event.registrations);
        stats.total_capacity += u64::from(event.capacity);
        stats.total += 1;
    }

    stats.active = stats.by_status.upcoming + stats.by_status.ongoing;
    stats.pending_approval = stats.by_status.draft;
    stats
}
