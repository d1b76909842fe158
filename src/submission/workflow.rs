//! Event submission workflow
//!
//! One instance per open "create event" interaction:
//!
//! ```text
//!   Editing ──submit──▶ Submitting ──ok──▶ Confirmed ──delay──▶ Closed
//!     ▲  │                  │                                     │
//!     │  └─cancel─▶ Closed  └──error──▶ Editing (draft kept)      │
//!     └──────────────────────────── reopen ◀──────────────────────┘
//! ```
//!
//! The service call runs on its own task so the outcome is applied exactly
//! once even if the caller stops waiting. The confirmation reset is a
//! scheduled task that only holds a weak reference to the instance state;
//! it is aborted on `close()` and on drop.

use crate::error::{Error, Result};
use crate::events::types::{Event, NewEvent};
use crate::submission::draft::{EventDraft, FieldUpdate};
use crate::submission::service::{EventService, IdentityProvider};
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default visibility window of the confirmation state
pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

/// Workflow lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Draft is editable
    Editing,
    /// Candidate handed to the creation service, awaiting the response
    Submitting,
    /// Service accepted the event; reset is scheduled
    Confirmed,
    /// Cancelled or reset after confirmation
    Closed,
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Editing => write!(f, "editing"),
            Self::Submitting => write!(f, "submitting"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Point-in-time view of a workflow instance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub id: String,
    pub state: WorkflowState,
    pub draft: EventDraft,
    pub created: Option<Event>,
    pub last_error: Option<String>,
}

struct WorkflowInner {
    state: WorkflowState,
    draft: EventDraft,
    created: Option<Event>,
    last_error: Option<String>,
    /// Bumped on every submit and close; a reset task only acts on its own
    generation: u64,
    reset_task: Option<JoinHandle<()>>,
    /// Last open, edit or submit by the actor
    last_activity: Instant,
}

impl WorkflowInner {
    fn new() -> Self {
        Self {
            state: WorkflowState::Editing,
            draft: EventDraft::default(),
            created: None,
            last_error: None,
            generation: 0,
            reset_task: None,
            last_activity: Instant::now(),
        }
    }

    /// Discard the draft and close
    fn close(&mut self) {
        if let Some(handle) = self.reset_task.take() {
            handle.abort();
        }
        self.generation += 1;
        self.state = WorkflowState::Closed;
        self.draft = EventDraft::default();
        self.created = None;
    }
}

/// A single event-creation interaction
pub struct SubmissionWorkflow {
    id: String,
    inner: Arc<RwLock<WorkflowInner>>,
    service: Arc<dyn EventService>,
    identity: Arc<dyn IdentityProvider>,
    confirmation_delay: Duration,
}

impl SubmissionWorkflow {
    /// Open a new workflow with an empty draft
    pub fn new(
        service: Arc<dyn EventService>,
        identity: Arc<dyn IdentityProvider>,
        confirmation_delay: Duration,
    ) -> Self {
        Self {
            id: format!("sub-{}", uuid::Uuid::new_v4()),
            inner: Arc::new(RwLock::new(WorkflowInner::new())),
            service,
            identity,
            confirmation_delay,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.read().await.state
    }

    pub async fn draft(&self) -> EventDraft {
        self.inner.read().await.draft.clone()
    }

    /// Error recorded by the last failed submit, cleared on the next attempt
    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Time since the actor last opened, edited or submitted the draft
    pub async fn idle_for(&self) -> Duration {
        self.inner.read().await.last_activity.elapsed()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.inner.read().await;
        WorkflowSnapshot {
            id: self.id.clone(),
            state: inner.state,
            draft: inner.draft.clone(),
            created: inner.created.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    /// Apply one field edit. Only allowed while editing.
    pub async fn update_field(&self, update: FieldUpdate) -> Result<EventDraft> {
        let mut inner = self.inner.write().await;
        if inner.state != WorkflowState::Editing {
            return Err(Error::InvalidState(format!(
                "draft is not editable while {}",
                inner.state
            )));
        }

        tracing::debug!(workflow = %self.id, field = %update.field, "Draft field updated");
        inner.last_activity = Instant::now();
        let draft = std::mem::take(&mut inner.draft);
        inner.draft = draft.apply(update);
        Ok(inner.draft.clone())
    }

    /// Validate the draft and hand the candidate to the creation service.
    ///
    /// Rejected without calling the service when not editing, when no actor
    /// is authenticated, or when the draft is invalid; the workflow then
    /// stays where it was. A service failure returns the workflow to
    /// `Editing` with the draft untouched.
    pub async fn submit(&self) -> Result<Event> {
        let (candidate, generation) = {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();
            if inner.state != WorkflowState::Editing {
                tracing::warn!(workflow = %self.id, state = %inner.state, "Submit rejected");
                return Err(Error::InvalidState(format!(
                    "cannot submit while {}",
                    inner.state
                )));
            }

            let prepared = self
                .identity
                .current_actor()
                .ok_or_else(|| {
                    Error::Authorization("no authenticated actor to organize the event".to_string())
                })
                .and_then(|actor| inner.draft.validate(actor.into()));

            let candidate = match prepared {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::warn!(workflow = %self.id, error = %e, "Submission precondition failed");
                    inner.last_error = Some(e.to_string());
                    return Err(e);
                }
            };

            inner.state = WorkflowState::Submitting;
            inner.last_error = None;
            inner.generation += 1;
            (candidate, inner.generation)
        };

        tracing::info!(
            workflow = %self.id,
            title = %candidate.title,
            capacity = candidate.capacity,
            "Submitting event for approval"
        );

        let call = tokio::spawn(call_service(
            self.id.clone(),
            self.inner.clone(),
            self.service.clone(),
            candidate,
            generation,
            self.confirmation_delay,
        ));

        match call.await {
            Ok(result) => result,
            Err(join_err) => {
                let err = Error::Service(format!("event service call aborted: {}", join_err));
                tracing::error!(workflow = %self.id, error = %err, "Error creating event");
                let mut inner = self.inner.write().await;
                if inner.state == WorkflowState::Submitting && inner.generation == generation {
                    inner.state = WorkflowState::Editing;
                    inner.last_error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Abandon the draft. Only allowed while editing.
    pub async fn cancel(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state != WorkflowState::Editing {
            return Err(Error::InvalidState(format!(
                "cannot cancel while {}",
                inner.state
            )));
        }
        inner.close();
        tracing::info!(workflow = %self.id, "Submission cancelled");
        Ok(())
    }

    /// Start over with an empty draft after the workflow closed
    pub async fn reopen(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state != WorkflowState::Closed {
            return Err(Error::InvalidState(format!(
                "cannot reopen while {}",
                inner.state
            )));
        }
        inner.state = WorkflowState::Editing;
        inner.draft = EventDraft::default();
        inner.last_error = None;
        inner.last_activity = Instant::now();
        Ok(())
    }

    /// Tear the instance down: cancel any pending reset and close.
    /// A submission still in flight completes but no longer confirms.
    pub async fn close(&self) {
        let mut inner = self.inner.write().await;
        if inner.state != WorkflowState::Closed {
            tracing::debug!(workflow = %self.id, state = %inner.state, "Closing workflow");
        }
        inner.close();
    }
}

impl Drop for SubmissionWorkflow {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_write() {
            if let Some(handle) = inner.reset_task.take() {
                handle.abort();
            }
        }
    }
}

/// Run the service call and apply its outcome to the workflow state
async fn call_service(
    id: String,
    inner: Arc<RwLock<WorkflowInner>>,
    service: Arc<dyn EventService>,
    candidate: NewEvent,
    generation: u64,
    confirmation_delay: Duration,
) -> Result<Event> {
    let result = service.create_event(candidate).await.map_err(|e| match e {
        Error::Service(_) => e,
        other => Error::Service(other.to_string()),
    });

    let mut guard = inner.write().await;
    if guard.state != WorkflowState::Submitting || guard.generation != generation {
        tracing::debug!(workflow = %id, "Workflow closed while submitting; outcome not applied");
        return result;
    }

    match result {
        Ok(event) => {
            guard.state = WorkflowState::Confirmed;
            guard.created = Some(event.clone());
            guard.reset_task = Some(schedule_reset(
                id.clone(),
                Arc::downgrade(&inner),
                generation,
                confirmation_delay,
            ));
            tracing::info!(workflow = %id, event = %event.id, "Event submitted for approval");
            Ok(event)
        }
        Err(e) => {
            tracing::error!(workflow = %id, error = %e, "Error creating event");
            guard.state = WorkflowState::Editing;
            guard.last_error = Some(e.to_string());
            Err(e)
        }
    }
}

/// Reset the workflow once the confirmation window has elapsed
fn schedule_reset(
    id: String,
    inner: Weak<RwLock<WorkflowInner>>,
    generation: u64,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut inner = inner.write().await;
        if inner.state != WorkflowState::Confirmed || inner.generation != generation {
            return;
        }
        // Drop our own handle without aborting the running task
        inner.reset_task = None;
        inner.close();
        tracing::info!(workflow = %id, "Confirmation window elapsed; workflow reset");
    })
}
