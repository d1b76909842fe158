//! Event draft: the raw form record and its field reducer
//!
//! Every input control writes a string into the draft. Edits are applied
//! as [`FieldUpdate`] messages through [`EventDraft::apply`], which replaces
//! exactly one field and performs no validation. Validation happens once,
//! in [`EventDraft::validate`], when the draft is turned into a candidate.

use crate::error::{Error, Result};
use crate::events::types::{default_price, EventCategory, EventStatus, NewEvent, Organizer};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// An editable draft field, named after its form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Title,
    Description,
    Date,
    Time,
    Location,
    Category,
    Capacity,
    Price,
    #[serde(alias = "imageUrl")]
    ImageUrl,
}

impl DraftField {
    /// Fields that must be non-empty before submission
    pub const REQUIRED: [DraftField; 7] = [
        Self::Title,
        Self::Date,
        Self::Time,
        Self::Location,
        Self::Description,
        Self::Category,
        Self::Capacity,
    ];
}

impl std::fmt::Display for DraftField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Date => "date",
            Self::Time => "time",
            Self::Location => "location",
            Self::Category => "category",
            Self::Capacity => "capacity",
            Self::Price => "price",
            Self::ImageUrl => "image_url",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "location" => Ok(Self::Location),
            "category" => Ok(Self::Category),
            "capacity" => Ok(Self::Capacity),
            "price" => Ok(Self::Price),
            "image_url" | "imageUrl" => Ok(Self::ImageUrl),
            other => Err(format!("unknown draft field: {}", other)),
        }
    }
}

/// A single field edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub field: DraftField,
    pub value: String,
}

impl FieldUpdate {
    pub fn new(field: DraftField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// An event under construction, every field as typed by the actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: String,
    pub price: String,
    pub image_url: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: String::new(),
            time: String::new(),
            location: String::new(),
            category: String::new(),
            capacity: String::new(),
            price: default_price(),
            image_url: String::new(),
        }
    }
}

impl EventDraft {
    /// Current raw value of a field
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Description => &self.description,
            DraftField::Date => &self.date,
            DraftField::Time => &self.time,
            DraftField::Location => &self.location,
            DraftField::Category => &self.category,
            DraftField::Capacity => &self.capacity,
            DraftField::Price => &self.price,
            DraftField::ImageUrl => &self.image_url,
        }
    }

    /// Return a new draft with exactly one field replaced
    pub fn apply(mut self, update: FieldUpdate) -> Self {
        let slot = match update.field {
            DraftField::Title => &mut self.title,
            DraftField::Description => &mut self.description,
            DraftField::Date => &mut self.date,
            DraftField::Time => &mut self.time,
            DraftField::Location => &mut self.location,
            DraftField::Category => &mut self.category,
            DraftField::Capacity => &mut self.capacity,
            DraftField::Price => &mut self.price,
            DraftField::ImageUrl => &mut self.image_url,
        };
        *slot = update.value;
        self
    }

    /// Required fields that are still blank
    pub fn missing_fields(&self) -> Vec<DraftField> {
        DraftField::REQUIRED
            .into_iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }

    /// Resolve the draft into a creation candidate for `organizer`.
    ///
    /// The candidate always starts as [`EventStatus::Draft`].
    pub fn validate(&self, organizer: Organizer) -> Result<NewEvent> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
            return Err(Error::Validation(format!(
                "missing required fields: {}",
                names.join(", ")
            )));
        }

        let capacity = parse_capacity(&self.capacity)?;
        let date = parse_date(&self.date)?;
        let time = parse_time(&self.time)?;
        let category: EventCategory = self
            .category
            .parse()
            .map_err(|e: String| Error::Validation(format!("category: {}", e)))?;
        let image_url = parse_image_url(&self.image_url)?;

        let price = match self.price.trim() {
            "" => default_price(),
            p => p.to_string(),
        };

        Ok(NewEvent {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date,
            time,
            location: self.location.trim().to_string(),
            category,
            capacity,
            price,
            image_url,
            status: EventStatus::Draft,
            organizer,
        })
    }
}

fn parse_capacity(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Validation(format!(
            "capacity must be a positive integer, got '{}'",
            raw
        ))),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("date must be YYYY-MM-DD, got '{}'", raw)))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map_err(|_| Error::Validation(format!("time must be HH:MM, got '{}'", raw)))
}

fn parse_image_url(raw: &str) -> Result<Option<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    url::Url::parse(raw)
        .map(|u| Some(u.to_string()))
        .map_err(|e| Error::Validation(format!("image_url: {}", e)))
}
