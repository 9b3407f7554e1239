use serde::{Deserialize, Serialize};

/// Defaults applied by the query translator when a request leaves a listing
/// parameter out (or supplies something unusable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page used when `page` is missing or malformed. Default: 1.
    pub default_page: u32,
    /// Page size used when `limit` is missing or malformed. Default: 10.
    pub default_limit: u32,
    /// Sort applied when `sort` is missing, in `sort` parameter syntax.
    /// Default: newest first (`-created_at`).
    pub default_sort: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 10,
            default_sort: "-created_at".to_string(),
        }
    }
}
