//! Accounts: authentication, the caller's own profile and administration.

pub mod auth;
pub mod user_handlers;
