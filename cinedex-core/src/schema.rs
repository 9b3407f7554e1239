//! Field capabilities of stored record types.
//!
//! The query translator accepts any field name a caller supplies. Whether a
//! field exists, and how a query-string value is coerced for it, is decided
//! here by the record type's [`Resource`] description and enforced by the
//! stores.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Storage type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Uuid,
    Timestamp,
    /// A list of strings; predicates match when any element matches.
    TextList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A record type that can live in a collection.
pub trait Resource:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Collection (and PostgreSQL table) name.
    const COLLECTION: &'static str;

    /// Every stored field, in table column order.
    const FIELDS: &'static [FieldSpec];

    /// Text fields matched by the free-text `search` parameter.
    const SEARCH_FIELDS: &'static [&'static str];

    fn id(&self) -> Uuid;

    /// `(field, value)` pairs that must be unique across the collection.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|spec| spec.name == name)
    }
}

/// A query-string value coerced to the type of the field it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldKind {
    /// Coerce a raw query-string value for this field kind.
    pub fn coerce(self, field: &str, raw: &str) -> Result<TypedValue> {
        let invalid = || StoreError::invalid_value(field, raw);
        match self {
            FieldKind::Text | FieldKind::TextList => {
                Ok(TypedValue::Text(raw.to_string()))
            }
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(TypedValue::Number)
                .ok_or_else(invalid),
            FieldKind::Boolean => match raw.trim() {
                "true" | "1" => Ok(TypedValue::Boolean(true)),
                "false" | "0" => Ok(TypedValue::Boolean(false)),
                _ => Err(invalid()),
            },
            FieldKind::Uuid => Uuid::parse_str(raw.trim())
                .map(TypedValue::Uuid)
                .map_err(|_| invalid()),
            FieldKind::Timestamp => parse_timestamp(raw.trim())
                .map(TypedValue::Timestamp)
                .ok_or_else(invalid),
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, FieldKind::TextList)
    }

    /// Order two stored values of this kind. Missing and null values sort
    /// first; values of an unexpected shape compare equal.
    pub fn compare_stored(
        self,
        left: Option<&Value>,
        right: Option<&Value>,
    ) -> Ordering {
        let left = left.filter(|value| !value.is_null());
        let right = right.filter(|value| !value.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => match self {
                FieldKind::Number => match (left.as_f64(), right.as_f64()) {
                    (Some(l), Some(r)) => {
                        l.partial_cmp(&r).unwrap_or(Ordering::Equal)
                    }
                    _ => Ordering::Equal,
                },
                FieldKind::Boolean => left.as_bool().cmp(&right.as_bool()),
                FieldKind::Timestamp => {
                    let l = left.as_str().and_then(parse_timestamp);
                    let r = right.as_str().and_then(parse_timestamp);
                    l.cmp(&r)
                }
                FieldKind::Text | FieldKind::Uuid => {
                    left.as_str().cmp(&right.as_str())
                }
                FieldKind::TextList => {
                    first_text(left).cmp(&first_text(right))
                }
            },
        }
    }
}

impl TypedValue {
    /// Where a stored scalar sits relative to this value (`stored.cmp(self)`).
    /// `None` when the stored value is null or of a different shape.
    pub fn stored_ordering(&self, stored: &Value) -> Option<Ordering> {
        match (self, stored) {
            (TypedValue::Text(value), Value::String(stored)) => {
                Some(stored.as_str().cmp(value.as_str()))
            }
            (TypedValue::Number(value), Value::Number(stored)) => {
                stored.as_f64()?.partial_cmp(value)
            }
            (TypedValue::Boolean(value), Value::Bool(stored)) => {
                Some(stored.cmp(value))
            }
            (TypedValue::Uuid(value), Value::String(stored)) => {
                Uuid::parse_str(stored).ok().map(|stored| stored.cmp(value))
            }
            (TypedValue::Timestamp(value), Value::String(stored)) => {
                parse_timestamp(stored).map(|stored| stored.cmp(value))
            }
            _ => None,
        }
    }
}

/// RFC 3339 timestamps, or bare `YYYY-MM-DD` dates at midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn first_text(value: &Value) -> Option<&str> {
    value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers_and_rejects_garbage() {
        assert_eq!(
            FieldKind::Number.coerce("rating", "8").unwrap(),
            TypedValue::Number(8.0)
        );
        assert_eq!(
            FieldKind::Number.coerce("rating", " 7.5 ").unwrap(),
            TypedValue::Number(7.5)
        );
        assert!(matches!(
            FieldKind::Number.coerce("rating", "high"),
            Err(StoreError::InvalidValue { .. })
        ));
        assert!(FieldKind::Number.coerce("rating", "NaN").is_err());
    }

    #[test]
    fn coerces_dates_and_booleans() {
        let parsed =
            FieldKind::Timestamp.coerce("created_at", "2024-03-01").unwrap();
        let midnight = parse_timestamp("2024-03-01T00:00:00Z").unwrap();
        assert_eq!(parsed, TypedValue::Timestamp(midnight));
        assert_eq!(
            FieldKind::Boolean.coerce("is_active", "false").unwrap(),
            TypedValue::Boolean(false)
        );
        assert!(FieldKind::Boolean.coerce("is_active", "maybe").is_err());
    }

    #[test]
    fn stored_ordering_respects_shape() {
        let eight = TypedValue::Number(8.0);
        assert_eq!(eight.stored_ordering(&json!(9.1)), Some(Ordering::Greater));
        assert_eq!(eight.stored_ordering(&json!(8)), Some(Ordering::Equal));
        assert_eq!(eight.stored_ordering(&json!("9")), None);
        assert_eq!(eight.stored_ordering(&Value::Null), None);
    }

    #[test]
    fn timestamps_order_chronologically_not_lexically() {
        let whole = json!("2024-01-01T10:00:00Z");
        let fractional = json!("2024-01-01T10:00:00.500Z");
        assert_eq!(
            FieldKind::Timestamp
                .compare_stored(Some(&whole), Some(&fractional)),
            Ordering::Less
        );
        assert_eq!(
            FieldKind::Timestamp.compare_stored(None, Some(&whole)),
            Ordering::Less
        );
    }
}
