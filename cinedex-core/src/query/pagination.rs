use serde::{Deserialize, Serialize};

/// A `{page, limit}` pair as reported in the listing envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageToken {
    pub page: u32,
    pub limit: u32,
}

/// Neighbouring pages of a listing. Absent links are omitted when serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageToken>,
}

/// One-based page window. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PaginationWindow {
    page: u32,
    limit: u32,
}

impl PaginationWindow {
    /// Zero values are raised to 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a window from raw `page`/`limit` values. Anything that does not
    /// read as a positive integer falls back to the given default.
    pub fn from_raw(
        page: Option<&str>,
        limit: Option<&str>,
        default_page: u32,
        default_limit: u32,
    ) -> Self {
        Self::new(
            page.and_then(parse_positive).unwrap_or(default_page),
            limit.and_then(parse_positive).unwrap_or(default_limit),
        )
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Records to skip: `(page - 1) * limit`.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.page) * u64::from(self.limit) < total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn descriptor(&self, total: u64) -> PaginationDescriptor {
        PaginationDescriptor {
            next: self.has_next(total).then(|| PageToken {
                page: self.page.saturating_add(1),
                limit: self.limit,
            }),
            prev: self.has_previous().then(|| PageToken {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

/// Read the leading integer of `raw` the way lenient form parsers do
/// (`"3"`, `" 3"`, `"3abc"` and `"3.7"` all read as 3). Values below 1, or
/// without leading digits, yield `None`.
fn parse_positive(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..digits_end]
        .parse::<u32>()
        .ok()
        .filter(|value| *value >= 1)
}
