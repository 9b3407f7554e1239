//! Placeholder secrets and default file locations.

/// Signing secret used when none is configured. Accepted, but warned about.
pub const DEFAULT_JWT_SECRET: &str = "change-me-cinedex-jwt-secret";

/// Password pepper used when none is configured. Accepted, but warned about.
pub const DEFAULT_PASSWORD_PEPPER: &str = "change-me-cinedex-password-pepper";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "CINEDEX_CONFIG";

/// Locations checked, in order, when no configuration file is named.
pub const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["cinedex.toml", "config/cinedex.toml"];
