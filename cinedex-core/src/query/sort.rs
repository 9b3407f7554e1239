use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    /// `-field` sorts descending, `field` ascending.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (field, direction) = match token.strip_prefix('-') {
            Some(field) => (field.trim(), SortDirection::Descending),
            None => (token, SortDirection::Ascending),
        };

        if field.is_empty() {
            return None;
        }

        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Ordered sort keys; the first key is primary, later keys break ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse a comma-separated `sort` value. `None` when no usable token
    /// remains after dropping blanks.
    pub fn parse(raw: &str) -> Option<Self> {
        let keys: Vec<SortKey> =
            raw.split(',').filter_map(SortKey::parse).collect();
        if keys.is_empty() {
            None
        } else {
            Some(Self { keys })
        }
    }

    pub fn from_keys(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }
}
