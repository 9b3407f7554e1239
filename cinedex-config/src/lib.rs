//! Shared configuration library for Cinedex.
//!
//! Configuration is composed from an optional `.env` file, an optional TOML
//! file and environment variables, in increasing order of precedence. The
//! server applies command-line overrides on top of the loaded [`Config`].

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    HstsSettings, RateLimitConfig, SecurityConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};

pub use cinedex_core::query::QueryConfig;
