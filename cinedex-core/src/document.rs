use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// A stored record in its JSON form. Stores filter, sort and project these;
/// typed records are converted at the edges.
pub type Document = Map<String, Value>;

/// Serialize a record into a document. Records must serialize to JSON objects.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Internal(format!(
            "record serialized to {} instead of an object",
            json_type_name(&other)
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
