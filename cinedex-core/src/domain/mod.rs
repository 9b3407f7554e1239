//! Domain layer entry modules.

pub mod movies;
pub mod users;
pub mod validation;

pub use validation::ValidationError;
