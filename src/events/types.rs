//! Event catalog types
//!
//! Defines the catalog record, its category/status enums, the resolved
//! candidate sent to the creation service, and the aggregate statistics.
//! All wire types use camelCase JSON serialization.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(alias = "technical")]
    Technical,
    #[serde(alias = "cultural")]
    Cultural,
    #[serde(alias = "sports")]
    Sports,
    #[serde(alias = "academic")]
    Academic,
    #[serde(alias = "workshop")]
    Workshop,
    #[serde(alias = "seminar")]
    Seminar,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        Self::Technical,
        Self::Cultural,
        Self::Sports,
        Self::Academic,
        Self::Workshop,
        Self::Seminar,
    ];
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Technical => write!(f, "Technical"),
            Self::Cultural => write!(f, "Cultural"),
            Self::Sports => write!(f, "Sports"),
            Self::Academic => write!(f, "Academic"),
            Self::Workshop => write!(f, "Workshop"),
            Self::Seminar => write!(f, "Seminar"),
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "cultural" => Ok(Self::Cultural),
            "sports" => Ok(Self::Sports),
            "academic" => Ok(Self::Academic),
            "workshop" => Ok(Self::Workshop),
            "seminar" => Ok(Self::Seminar),
            other => Err(format!("unknown event category: {}", other)),
        }
    }
}

/// Approval status. Moves only forward: draft → upcoming → ongoing → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [
        Self::Draft,
        Self::Upcoming,
        Self::Ongoing,
        Self::Completed,
    ];

    /// Whether `next` is strictly later in the lifecycle
    pub fn can_advance_to(self, next: EventStatus) -> bool {
        next > self
    }

    /// Registrations are accepted only once approved and until completed
    pub fn accepts_registrations(self) -> bool {
        matches!(self, Self::Upcoming | Self::Ongoing)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Upcoming => write!(f, "upcoming"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// Who organizes the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
}

/// A catalog event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category: EventCategory,
    pub capacity: u32,
    #[serde(default = "default_price")]
    pub price: String,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub registrations: u32,
    pub organizer: Organizer,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Seats still available
    pub fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.registrations)
    }
}

/// A fully resolved event candidate, as accepted by the creation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category: EventCategory,
    pub capacity: u32,
    #[serde(default = "default_price")]
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub organizer: Organizer,
}

pub(crate) fn default_price() -> String {
    "Free".to_string()
}

/// Event counts by status
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub draft: u64,
    pub upcoming: u64,
    pub ongoing: u64,
    pub completed: u64,
}

/// Aggregate catalog statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total: u64,
    /// Upcoming plus ongoing
    pub active: u64,
    /// Drafts awaiting admin approval
    pub pending_approval: u64,
    pub total_registrations: u64,
    pub total_capacity: u64,
    pub by_status: StatusCounts,
    pub by_category: BTreeMap<EventCategory, u64>,
}

/// Request body for advancing an event's status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceStatusRequest {
    pub status: EventStatus,
}

/// Request body for recording registrations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default = "default_seats")]
    pub seats: u32,
}

fn default_seats() -> u32 {
    1
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl ApiError {
    /// Map a crate error to its HTTP status and error body
    pub fn from_error(err: &crate::Error) -> (axum::http::StatusCode, Self) {
        use crate::Error;
        use axum::http::StatusCode;

        let message = err.to_string();
        match err {
            Error::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Self::new("VALIDATION_ERROR", message),
            ),
            Error::Authorization(_) => (
                StatusCode::UNAUTHORIZED,
                Self::new("UNAUTHORIZED", message),
            ),
            Error::InvalidState(_) => (StatusCode::CONFLICT, Self::new("CONFLICT", message)),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, Self::not_found(message)),
            Error::Service(_) | Error::Http(_) => (
                StatusCode::BAD_GATEWAY,
                Self::new("SERVICE_ERROR", message),
            ),
            Error::Config(_) | Error::Io(_) | Error::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Self::internal(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            id: "evt-1".to_string(),
            title: "Tech Symposium 2025".to_string(),
            description: "Talks and demos".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            location: "Main Auditorium".to_string(),
            category: EventCategory::Technical,
            capacity: 200,
            price: "Free".to_string(),
            image_url: None,
            status: EventStatus::Upcoming,
            registrations: 150,
            organizer: Organizer {
                id: "fac-7".to_string(),
                name: "Dr. Rao".to_string(),
                contact: None,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"id\":\"evt-1\""));
        assert!(json.contains("\"category\":\"Technical\""));
        assert!(json.contains("\"status\":\"upcoming\""));
        assert!(json.contains("\"date\":\"2025-03-15\""));
        assert!(json.contains("\"imageUrl\":null"));
        assert!(json.contains("\"createdAt\""));

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_new_event_defaults() {
        let json = r#"{
            "title": "Cultural Fest",
            "description": "Music and dance",
            "date": "2025-04-20",
            "time": "18:00:00",
            "location": "Open Air Theatre",
            "category": "cultural",
            "capacity": 500,
            "status": "draft",
            "organizer": {"id": "fac-1", "name": "Prof. Iyer", "contact": null}
        }"#;

        let candidate: NewEvent = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.category, EventCategory::Cultural);
        assert_eq!(candidate.price, "Free");
        assert!(candidate.image_url.is_none());
        assert_eq!(candidate.status, EventStatus::Draft);
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("technical".parse::<EventCategory>().unwrap(), EventCategory::Technical);
        assert_eq!("SEMINAR".parse::<EventCategory>().unwrap(), EventCategory::Seminar);
        assert_eq!(" Workshop ".parse::<EventCategory>().unwrap(), EventCategory::Workshop);
        assert!("music".parse::<EventCategory>().is_err());
        assert_eq!(EventCategory::Academic.to_string(), "Academic");
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("Ongoing".parse::<EventStatus>().unwrap(), EventStatus::Ongoing);
        assert!("cancelled".parse::<EventStatus>().is_err());
        assert_eq!(EventStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_status_only_moves_forward() {
        assert!(EventStatus::Draft.can_advance_to(EventStatus::Upcoming));
        assert!(EventStatus::Draft.can_advance_to(EventStatus::Completed));
        assert!(EventStatus::Upcoming.can_advance_to(EventStatus::Ongoing));
        assert!(!EventStatus::Ongoing.can_advance_to(EventStatus::Upcoming));
        assert!(!EventStatus::Completed.can_advance_to(EventStatus::Draft));
        assert!(!EventStatus::Upcoming.can_advance_to(EventStatus::Upcoming));
    }

    #[test]
    fn test_accepts_registrations() {
        assert!(!EventStatus::Draft.accepts_registrations());
        assert!(EventStatus::Upcoming.accepts_registrations());
        assert!(EventStatus::Ongoing.accepts_registrations());
        assert!(!EventStatus::Completed.accepts_registrations());
    }

    #[test]
    fn test_seats_left() {
        let mut event = sample_event();
        assert_eq!(event.seats_left(), 50);
        event.registrations = 200;
        assert_eq!(event.seats_left(), 0);
    }

    #[test]
    fn test_stats_serialization() {
        let mut stats = EventStats {
            total: 2,
            ..Default::default()
        };
        stats.by_category.insert(EventCategory::Technical, 2);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"pendingApproval\":0"));
        assert!(json.contains("\"byCategory\":{\"Technical\":2}"));
    }

    #[test]
    fn test_api_error_from_validation() {
        let err = crate::Error::Validation("capacity".to_string());
        let (status, body) = ApiError::from_error(&err);
        assert_eq!(status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::not_found("Event evt-999 not found");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("evt-999"));
    }
}
