//! Handlers shared by every resource.

pub mod health;
pub mod listing;

pub use health::health;
pub use listing::list_resource;
