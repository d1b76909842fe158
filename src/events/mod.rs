//! Events module — campus event catalog
//!
//! Provides the filter engine over the ordered catalog, the file-backed
//! store, and REST endpoints for browsing, creating, approving and
//! registering. Events are persisted as JSON files under
//! `<data-local>/campus-events/events/`.

pub mod filter;
pub mod handler;
pub mod store;
pub mod types;

pub use filter::{visible_events, CategoryFilter, FilterSpec, StatusFilter};
pub use handler::{events_router, EventsState};
pub use store::EventStore;
