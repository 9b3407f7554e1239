//! API-facing facade (route constants and response envelopes).

pub mod responses;
pub mod routes;

pub use responses::{
    ApiResponse, ErrorDetail, ErrorResponse, HealthStatus, ListResponse,
};
