use bson::{oid::ObjectId, Bson, DateTime, Document};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Path `{0}` is required")]
    MissingField(String),
    #[error("`{value}` is not a valid value for `{field}`, expected one of [{allowed}]")]
    InvalidEnum {
        field: String,
        value: String,
        allowed: String,
    },
    #[error("`{value}` is not a valid ObjectId for `{field}`")]
    InvalidObjectId { field: String, value: String },
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Update must set at least one field")]
    EmptyUpdate,
    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
}

/// Converts an unchecked candidate into the value that gets persisted.
///
/// Candidates for new entities produce the entity itself with defaults applied.
/// Partial updates produce the `$set` document to hand to the store.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

/// String-valued enums with a closed set of stored representations.
pub trait SchemaEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn parse(value: &str, field: &str) -> Result<Self, ValidationError> {
        Self::VARIANTS
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, variant)| *variant)
            .ok_or_else(|| ValidationError::InvalidEnum {
                field: field.to_string(),
                value: value.to_string(),
                allowed: Self::VARIANTS
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

/// Required strings are trimmed; an empty result counts as missing.
pub fn required_text(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field.to_string())),
    }
}

pub fn object_id(value: &str, field: &str) -> Result<ObjectId, ValidationError> {
    ObjectId::parse_str(value.trim()).map_err(|_| ValidationError::InvalidObjectId {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub fn optional_object_id(
    value: Option<String>,
    field: &str,
) -> Result<Option<ObjectId>, ValidationError> {
    value.map(|v| object_id(&v, field)).transpose()
}

pub fn object_ids(values: Vec<String>, field: &str) -> Result<Vec<ObjectId>, ValidationError> {
    values.iter().map(|v| object_id(v, field)).collect()
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn date(value: &str, field: &str) -> Result<DateTime, ValidationError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_rfc3339_str(value) {
        return Ok(parsed);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| DateTime::from_millis(Utc.from_utc_datetime(&midnight).timestamp_millis()))
        .ok_or_else(|| ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("`{}` is not a date", value),
        })
}

pub fn optional_date(value: Option<String>, field: &str) -> Result<Option<DateTime>, ValidationError> {
    value.map(|v| date(&v, field)).transpose()
}

pub fn non_negative(value: f64, field: &str) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} must be a non-negative number", value),
        })
    }
}

/// Adds `key: value` to a `$set` document being assembled from a partial update.
pub fn set_field<T: Serialize>(
    set: &mut Document,
    key: &str,
    value: &T,
) -> Result<(), ValidationError> {
    let value = bson::to_bson(value).map_err(|e| ValidationError::InvalidValue {
        field: key.to_string(),
        reason: e.to_string(),
    })?;
    set.insert(key, value);
    Ok(())
}

/// Wraps a non-empty set of field assignments as a `$set` update.
pub fn into_set_update(set: Document) -> Result<Document, ValidationError> {
    if set.is_empty() {
        return Err(ValidationError::EmptyUpdate);
    }
    let mut update = Document::new();
    update.insert("$set", Bson::Document(set));
    Ok(update)
}
