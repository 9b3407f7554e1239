pub mod sources;

use std::{path::PathBuf, time::Duration};

use cinedex_core::query::QueryConfig;

use crate::constants::{DEFAULT_JWT_SECRET, DEFAULT_PASSWORD_PEPPER};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub security: SecurityConfig,
    pub query: QueryConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// `host:port` the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Previous signing secrets still accepted when verifying tokens.
    pub retired_jwt_secrets: Vec<String>,
    pub token_ttl: Duration,
    pub password_pepper: String,
}

impl AuthConfig {
    pub fn is_default_pepper(&self) -> bool {
        self.password_pepper == DEFAULT_PASSWORD_PEPPER
    }

    pub fn is_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            retired_jwt_secrets: Vec::new(),
            token_ttl: Duration::from_secs(60 * 60),
            password_pepper: DEFAULT_PASSWORD_PEPPER.to_string(),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("retired_jwt_secrets", &self.retired_jwt_secrets.len())
            .field("token_ttl", &self.token_ttl)
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            allow_credentials: false,
        }
    }
}

/// Fixed-window request limit applied per client address.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    pub hsts: HstsSettings,
}

#[derive(Debug, Clone)]
pub struct HstsSettings {
    pub max_age: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl Default for HstsSettings {
    fn default() -> Self {
        Self {
            max_age: 31_536_000,
            include_subdomains: false,
            preload: false,
        }
    }
}

impl HstsSettings {
    /// `Strict-Transport-Security` header value.
    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}", self.max_age);
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsts_header_lists_enabled_directives() {
        let hsts = HstsSettings {
            max_age: 600,
            include_subdomains: true,
            preload: false,
        };
        assert_eq!(hsts.header_value(), "max-age=600; includeSubDomains");
        assert_eq!(HstsSettings::default().header_value(), "max-age=31536000");
    }

    #[test]
    fn auth_debug_redacts_secrets() {
        let rendered = format!("{:?}", AuthConfig::default());
        assert!(!rendered.contains(DEFAULT_JWT_SECRET));
        assert!(!rendered.contains(DEFAULT_PASSWORD_PEPPER));
    }
}
