use serde::Serialize;

use crate::document::Document;

/// Field that every projected record keeps.
pub const ID_FIELD: &str = "id";

/// Ordered field selection from the `select` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    /// Parse a comma-separated `select` value. `None` when no field remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields: Vec<String> = Vec::new();
        for field in raw.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if !fields.iter().any(|existing| existing == field) {
                fields.push(field.to_string());
            }
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Keep only the selected fields (plus `id`). Selected fields the record
    /// does not have are skipped.
    pub fn apply(&self, mut document: Document) -> Document {
        let mut projected = Document::new();
        if let Some(id) = document.remove(ID_FIELD) {
            projected.insert(ID_FIELD.to_string(), id);
        }
        for field in &self.fields {
            if let Some(value) = document.remove(field) {
                projected.insert(field.clone(), value);
            }
        }
        projected
    }
}
