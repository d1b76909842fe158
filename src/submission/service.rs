//! External collaborators of the submission workflow
//!
//! - [`EventService`]: accepts a resolved candidate and persists it
//! - [`IdentityProvider`]: supplies the authenticated actor, if any
//!
//! Both are injected into the workflow, never looked up ambiently.

use crate::error::{Error, Result};
use crate::events::types::{ApiError, Event, NewEvent, Organizer};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Event-creation service. Called at most once per submit, never retried.
#[async_trait::async_trait]
pub trait EventService: Send + Sync {
    /// Persist a candidate event, returning the stored record
    async fn create_event(&self, candidate: NewEvent) -> Result<Event>;
}

/// The authenticated actor's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorProfile {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
}

impl ActorProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: None,
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

impl From<ActorProfile> for Organizer {
    fn from(actor: ActorProfile) -> Self {
        Self {
            id: actor.id,
            name: actor.name,
            contact: actor.contact,
        }
    }
}

/// Source of the current actor's identity
pub trait IdentityProvider: Send + Sync {
    fn current_actor(&self) -> Option<ActorProfile>;
}

/// Identity fixed at construction
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    actor: Option<ActorProfile>,
}

impl StaticIdentity {
    pub fn new(actor: ActorProfile) -> Self {
        Self { actor: Some(actor) }
    }

    /// No authenticated actor
    pub fn anonymous() -> Self {
        Self { actor: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_actor(&self) -> Option<ActorProfile> {
        self.actor.clone()
    }
}

/// Event-creation service reached over HTTP (`POST {base_url}/api/v1/events`)
pub struct HttpEventService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventService {
    /// Create a client for the catalog API at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self) -> String {
        format!("{}/api/v1/events", self.base_url)
    }
}

#[async_trait::async_trait]
impl EventService for HttpEventService {
    async fn create_event(&self, candidate: NewEvent) -> Result<Event> {
        let response = self
            .client
            .post(self.events_url())
            .json(&candidate)
            .send()
            .await
            .map_err(|e| Error::Service(format!("event service unreachable: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Event>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(Error::Service(format!(
            "event service returned {}: {}",
            status, message
        )))
    }
}
