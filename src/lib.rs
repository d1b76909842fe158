//! Campus Events - event catalog and faculty submission service
//!
//! Students browse a catalog of campus events narrowed by a free-text query,
//! a category and an approval status. Faculty submit new events through a
//! workflow that validates the draft, hands it to the catalog for approval,
//! and briefly confirms before resetting.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       HTTP API (axum)                       │
//! │   /api/v1/events/*                 /api/v1/submissions/*    │
//! └──────────┬─────────────────────────────────┬───────────────┘
//!            │                                 │
//! ┌──────────▼──────────┐          ┌───────────▼─────────────┐
//! │    Filter Engine    │          │    WorkflowManager      │
//! │  query + category + │          │  Editing → Submitting → │
//! │  status, order kept │          │  Confirmed → (reset)    │
//! └──────────┬──────────┘          └───────────┬─────────────┘
//!            │                                 │ EventService
//! ┌──────────▼─────────────────────────────────▼───────────────┐
//! │              EventStore (JSON files on disk)                │
//! │        or HttpEventService (remote catalog over HTTP)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`events`]: catalog types, filter engine, store and HTTP handlers
//! - [`submission`]: draft, workflow state machine and HTTP handlers
//! - [`api`]: merged application router
//! - [`config`]: configuration management

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod submission;

pub use config::CampusEventsConfig;
pub use error::{Error, Result};
