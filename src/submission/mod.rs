//! Submission module — faculty event submission workflow
//!
//! A workflow collects a draft, validates it against the current actor,
//! hands the resolved candidate to an [`EventService`] and shows a short
//! confirmation before resetting. Workflows are tracked by
//! [`WorkflowManager`] and driven over HTTP by [`submissions_router`].

pub mod draft;
pub mod handler;
pub mod manager;
pub mod service;
pub mod workflow;

pub use draft::{DraftField, EventDraft, FieldUpdate};
pub use handler::{submissions_router, SubmissionsState};
pub use manager::{WorkflowManager, DEFAULT_IDLE_TIMEOUT};
pub use service::{ActorProfile, EventService, HttpEventService, IdentityProvider, StaticIdentity};
pub use workflow::{
    SubmissionWorkflow, WorkflowSnapshot, WorkflowState, DEFAULT_CONFIRMATION_DELAY,
};
