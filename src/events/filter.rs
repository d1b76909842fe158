//! Event filter engine
//!
//! Composes the title search, category and status predicates over an
//! event collection. Filtering is a pure function of the collection and
//! the [`FilterSpec`]: the output is the order-preserving subsequence of
//! events matching every active predicate.

use crate::events::types::{Event, EventCategory, EventStatus};
use serde::{Deserialize, Serialize};

/// Category constraint: every category, or exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: EventCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == category,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(category) => write!(f, "{}", category),
        }
    }
}

/// Status constraint: every status, or exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(EventStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: EventStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(status) => write!(f, "{}", status),
        }
    }
}

/// The current combination of search text, category and status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive title substring; empty matches everything
    pub query: String,
    pub category: CategoryFilter,
    pub status: StatusFilter,
}

impl FilterSpec {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Whether no predicate is active
    pub fn is_identity(&self) -> bool {
        self.query.is_empty()
            && self.category == CategoryFilter::All
            && self.status == StatusFilter::All
    }

    /// Whether a single event passes every active predicate
    pub fn matches(&self, event: &Event) -> bool {
        self.matcher().matches(event)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            query: self.query.to_lowercase(),
            spec: self,
        }
    }
}

/// A [`FilterSpec`] with its query lowered once for a whole pass
struct Matcher<'a> {
    query: String,
    spec: &'a FilterSpec,
}

impl Matcher<'_> {
    fn matches(&self, event: &Event) -> bool {
        self.spec.category.matches(event.category)
            && self.spec.status.matches(event.status)
            && (self.query.is_empty() || event.title.to_lowercase().contains(&self.query))
    }
}

/// Raw filter parameters as they arrive from a query string
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<FilterParams> for FilterSpec {
    type Error = String;

    fn try_from(params: FilterParams) -> Result<Self, Self::Error> {
        let category = match params.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c.parse()?,
            _ => CategoryFilter::All,
        };
        let status = match params.status.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => StatusFilter::All,
        };
        Ok(Self {
            query: params.q.unwrap_or_default(),
            category,
            status,
        })
    }
}

/// Events visible under `spec`, in their original order
pub fn visible_events<'a>(all_events: &'a [Event], spec: &FilterSpec) -> Vec<&'a Event> {
    let matcher = spec.matcher();
    all_events.iter().filter(|e| matcher.matches(e)).collect()
}
