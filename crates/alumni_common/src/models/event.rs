use crate::models::{generate_id, Entity};
use crate::validation::{
    into_set_update, required, required_text, set_field, Validate, ValidationError,
};
use bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Speaker {
    pub name: String,
    pub role: String,
    pub company: String,
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,
    pub id: String,
    pub title: String,
    pub location: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
    pub image: String,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    pub agenda: String,
    #[serde(default)]
    pub sponsors: Vec<String>,
    #[serde(default)]
    pub registered_count: i64,
    pub max_capacity: i64,
}

impl Entity for Event {
    const COLLECTION: &'static str = "events";
    const UNIQUE_KEYS: &'static [&'static str] = &["id"];
    const KIND: &'static str = "Event";
}

impl Event {
    /// Advisory capacity check; the store does not enforce it.
    pub fn is_full(&self) -> bool {
        self.registered_count >= self.max_capacity
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SpeakerInput {
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub image: Option<String>,
}

impl Validate for SpeakerInput {
    type Output = Speaker;

    fn validate(self) -> Result<Speaker, ValidationError> {
        Ok(Speaker {
            name: required_text(self.name, "speakers.name")?,
            role: required_text(self.role, "speakers.role")?,
            company: required_text(self.company, "speakers.company")?,
            image: required_text(self.image, "speakers.image")?,
        })
    }
}

fn validate_speakers(speakers: Vec<SpeakerInput>) -> Result<Vec<Speaker>, ValidationError> {
    speakers.into_iter().map(Validate::validate).collect()
}

fn count(value: i64, field: &str) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} must not be negative", value),
        });
    }
    Ok(value)
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub speakers: Vec<SpeakerInput>,
    pub agenda: Option<String>,
    #[serde(default)]
    pub sponsors: Vec<String>,
    pub registered_count: Option<i64>,
    pub max_capacity: Option<i64>,
}

impl Validate for NewEvent {
    type Output = Event;

    fn validate(self) -> Result<Event, ValidationError> {
        // a blank id is treated the same as an absent one
        let id = match self.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => generate_id(),
        };
        Ok(Event {
            oid: None,
            id,
            title: required_text(self.title, "title")?,
            location: required_text(self.location, "location")?,
            date: required_text(self.date, "date")?,
            time: required_text(self.time, "time")?,
            kind: required_text(self.kind, "type")?,
            price: required_text(self.price, "price")?,
            image: required_text(self.image, "image")?,
            speakers: validate_speakers(self.speakers)?,
            agenda: required_text(self.agenda, "agenda")?,
            sponsors: self.sponsors,
            registered_count: count(self.registered_count.unwrap_or(0), "registeredCount")?,
            max_capacity: count(required(self.max_capacity, "maxCapacity")?, "maxCapacity")?,
        })
    }
}

/// Partial update of an Event. `id` is immutable and registrations go
/// through the registration operation.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub title: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub speakers: Option<Vec<SpeakerInput>>,
    pub agenda: Option<String>,
    pub sponsors: Option<Vec<String>>,
    pub max_capacity: Option<i64>,
}

impl Validate for EventUpdate {
    type Output = Document;

    fn validate(self) -> Result<Document, ValidationError> {
        let mut set = Document::new();
        let required_fields = [
            ("title", self.title),
            ("location", self.location),
            ("date", self.date),
            ("time", self.time),
            ("type", self.kind),
            ("price", self.price),
            ("image", self.image),
            ("agenda", self.agenda),
        ];
        for (key, value) in required_fields {
            if value.is_some() {
                set_field(&mut set, key, &required_text(value, key)?)?;
            }
        }
        if let Some(speakers) = self.speakers {
            set_field(&mut set, "speakers", &validate_speakers(speakers)?)?;
        }
        if let Some(sponsors) = self.sponsors {
            set_field(&mut set, "sponsors", &sponsors)?;
        }
        if let Some(capacity) = self.max_capacity {
            set_field(&mut set, "maxCapacity", &count(capacity, "maxCapacity")?)?;
        }
        into_set_update(set)
    }
}
