//! # Cinedex Core
//!
//! Core library for the Cinedex catalog service, providing the domain types,
//! the query-string translator, record-store abstractions and statistics used
//! by `cinedex-server`.
//!
//! ## Overview
//!
//! - **Query translation**: turns listing query strings (`rating[gte]=8`,
//!   `sort=-rating,title`, `page=2`) into an immutable [`query::QueryPlan`]
//! - **Record stores**: a trait-based [`database::ports::Collection`] port
//!   with in-memory and PostgreSQL implementations
//! - **Domain**: movies, users, roles and request validation
//! - **Statistics**: grouped movie aggregates
//!
//! ## Examples
//!
//! ```no_run
//! use cinedex_core::{
//!     domain::movies::Movie,
//!     query::{QueryConfig, QueryParams, QueryTranslator},
//! };
//!
//! let translator = QueryTranslator::new(QueryConfig::default());
//! let params = QueryParams::parse("rating[gte]=8&sort=-rating&page=2");
//! let plan = translator.translate::<Movie>(&params);
//!
//! assert_eq!(plan.pagination().skip(), 10);
//! ```

/// Embedded SQL migrations for the PostgreSQL store.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Versioned route constants and response envelopes
pub mod api;

/// Record stores: ports, in-memory and PostgreSQL implementations
pub mod database;

/// JSON documents exchanged with record stores
pub mod document;

/// Movie and user domain types
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// Query-string translation into query plans
pub mod query;

/// Field capabilities of stored record types
pub mod schema;

pub use document::Document;
pub use error::{Result, StoreError};
