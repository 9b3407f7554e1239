//! # Cinedex Server
//!
//! REST API over a movie catalog and its user accounts.
//!
//! ## Overview
//!
//! - **Listings**: `GET /api/v1/movies` and `GET /api/v1/users` accept
//!   bracket filters (`rating[gte]=8`), free-text `search`, `select`, `sort`,
//!   `page` and `limit`, translated by [`cinedex_core::query::QueryTranslator`]
//! - **Accounts**: registration, login and profile updates with HS256 access
//!   tokens; the first registered account becomes the administrator
//! - **Administration**: movie CRUD and user management for admins
//! - **Statistics**: per-genre, per-director and per-year aggregates
//!
//! ## Architecture
//!
//! The server is built on Axum and stores records either in PostgreSQL or,
//! with `--in-memory`, in process memory.

pub mod handlers;
pub mod infra;
pub mod movies;
pub mod routes;
pub mod users;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
