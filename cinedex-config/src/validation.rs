use thiserror::Error;

use crate::models::{AuthConfig, Config, RateLimitConfig};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("invalid rate limit configuration: {reason}")]
    InvalidRateLimit { reason: String },
    #[error("invalid query defaults: {reason}")]
    InvalidQueryDefaults { reason: String },
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Whether any warning message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.items.iter().any(|item| item.message.contains(needle))
    }
}

/// Reject configurations that cannot work and warn about ones that are
/// merely unsafe.
pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    check_secrets(&config.auth, &mut warnings)?;
    check_rate_limit(&config.rate_limit, &mut warnings)?;

    if config.server.request_timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroDuration {
            field: "REQUEST_TIMEOUT",
        });
    }
    if config.auth.token_ttl.is_zero() {
        return Err(ConfigGuardRailError::ZeroDuration { field: "JWT_TTL" });
    }

    if config.query.default_page == 0 || config.query.default_limit == 0 {
        return Err(ConfigGuardRailError::InvalidQueryDefaults {
            reason: "default_page and default_limit must be at least 1".into(),
        });
    }

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers \
             will reject such configuration",
        );
    }

    if config.database.url.is_none() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; only in-memory mode is available",
            "Set DATABASE_URL or start the server with --in-memory",
        );
    }

    Ok(warnings)
}

fn check_secrets(
    auth: &AuthConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if auth.is_default_jwt_secret() {
        warnings.push_with_hint(
            "JWT_SECRET uses the default placeholder value",
            "Set JWT_SECRET to a random string of at least 32 characters",
        );
    } else if auth.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "JWT_SECRET",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    if auth.is_default_pepper() {
        warnings.push_with_hint(
            "AUTH_PASSWORD_PEPPER uses the default placeholder value",
            "Set AUTH_PASSWORD_PEPPER before storing real accounts; \
             changing it later invalidates every password",
        );
    } else if auth.password_pepper.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    if auth.retired_jwt_secrets.iter().any(|old| *old == auth.jwt_secret) {
        warnings.push("JWT_SECRET is also listed as a retired secret");
    }

    Ok(())
}

fn check_rate_limit(
    limits: &RateLimitConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if !limits.enabled {
        warnings.push(
            "Rate limiting disabled; API endpoints will run without throttling",
        );
        return Ok(());
    }
    if limits.max_requests == 0 {
        return Err(ConfigGuardRailError::InvalidRateLimit {
            reason: "max_requests must be at least 1".into(),
        });
    }
    if limits.window.is_zero() {
        return Err(ConfigGuardRailError::InvalidRateLimit {
            reason: "window must be longer than zero".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn strong(mut config: Config) -> Config {
        config.auth.jwt_secret = "j".repeat(MIN_SECRET_LENGTH);
        config.auth.password_pepper = "p".repeat(MIN_SECRET_LENGTH);
        config.database.url = Some("postgres://localhost/cinedex".into());
        config
    }

    #[test]
    fn defaults_only_warn() {
        let warnings = apply_guard_rails(&Config::default()).unwrap();
        assert!(warnings.mentions("JWT_SECRET"));
        assert!(warnings.mentions("AUTH_PASSWORD_PEPPER"));
        assert!(warnings.mentions("DATABASE_URL"));
    }

    #[test]
    fn strong_configuration_is_quiet() {
        let warnings = apply_guard_rails(&strong(Config::default())).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn short_custom_secret_is_rejected() {
        let mut config = strong(Config::default());
        config.auth.jwt_secret = "short".into();
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::WeakSecret { field: "JWT_SECRET", .. })
        ));
    }

    #[test]
    fn zero_rate_limit_window_is_rejected() {
        let mut config = strong(Config::default());
        config.rate_limit.window = Duration::ZERO;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::InvalidRateLimit { .. })
        ));
    }

    #[test]
    fn credentials_with_wildcard_origin_warn() {
        let mut config = strong(Config::default());
        config.cors.allowed_origins = vec!["*".into()];
        config.cors.allow_credentials = true;
        let warnings = apply_guard_rails(&config).unwrap();
        assert!(warnings.mentions("wildcard"));
    }
}
