//! Movie catalog endpoints.

pub mod movie_handlers;
pub mod stats_handlers;
