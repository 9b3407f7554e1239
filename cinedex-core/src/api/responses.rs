use serde::{Deserialize, Serialize};

use crate::{
    document::Document,
    query::{PaginationDescriptor, QueryOutcome},
};

/// `{ success, data }` envelope for single-item responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Envelope for listing endpoints.
///
/// `count` is the number of records in `data`; `total` counts every record
/// matching the filters regardless of pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub total: u64,
    pub pagination: PaginationDescriptor,
    pub data: Vec<Document>,
}

impl From<QueryOutcome> for ListResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            success: true,
            count: outcome.data.len(),
            total: outcome.total,
            pagination: outcome.pagination,
            data: outcome.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub status: u16,
}

/// `{ success: false, error: { message, status } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                message: message.into(),
                status,
            },
        }
    }
}

/// Body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}
