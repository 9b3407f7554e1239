use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    constants::CONFIG_PATH_VAR,
    util::{parse_bool, parse_csv},
};

/// Raw configuration as defined in a TOML file.
///
/// Durations are humantime strings (`"15m"`, `"1h"`) and are parsed while
/// composing the final [`Config`](super::Config).
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub rate_limit: FileRateLimitConfig,
    #[serde(default)]
    pub security: FileSecurityConfig,
    #[serde(default)]
    pub query: FileQueryConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retired_jwt_secrets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRateLimitConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_requests: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSecurityConfig {
    #[serde(default)]
    pub hsts: FileHstsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileHstsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileQueryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub request_timeout: Option<String>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub jwt_secret: Option<String>,
    pub retired_jwt_secrets: Option<Vec<String>>,
    pub jwt_ttl: Option<String>,
    pub auth_password_pepper: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub rate_limit_enabled: Option<bool>,
    pub rate_limit_window: Option<String>,
    pub rate_limit_max_requests: Option<u32>,
    pub hsts_max_age: Option<u64>,
    pub query_default_limit: Option<u32>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset and
    /// unparseable numbers are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };
        let number = |name: &str| -> Option<u64> {
            var(name).and_then(|raw| raw.trim().parse().ok())
        };
        let csv = |name: &str| var(name).map(|raw| parse_csv(&raw));
        let flag = |name: &str| var(name).and_then(|raw| parse_bool(&raw));

        Self {
            config_path: var(CONFIG_PATH_VAR).map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: number("SERVER_PORT")
                .and_then(|n| u16::try_from(n).ok()),
            request_timeout: var("REQUEST_TIMEOUT"),
            database_url: var("DATABASE_URL"),
            database_max_connections: number("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| u32::try_from(n).ok()),
            jwt_secret: var("JWT_SECRET"),
            retired_jwt_secrets: csv("JWT_RETIRED_SECRETS"),
            jwt_ttl: var("JWT_TTL"),
            auth_password_pepper: var("AUTH_PASSWORD_PEPPER"),
            cors_allowed_origins: csv("CORS_ALLOWED_ORIGINS"),
            cors_allow_credentials: flag("CORS_ALLOW_CREDENTIALS"),
            rate_limit_enabled: flag("RATE_LIMIT_ENABLED"),
            rate_limit_window: var("RATE_LIMIT_WINDOW"),
            rate_limit_max_requests: number("RATE_LIMIT_MAX_REQUESTS")
                .and_then(|n| u32::try_from(n).ok()),
            hsts_max_age: number("HSTS_MAX_AGE"),
            query_default_limit: number("QUERY_DEFAULT_LIMIT")
                .and_then(|n| u32::try_from(n).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn blank_and_malformed_values_are_unset() {
        let config = env(&[("SERVER_HOST", "  "), ("SERVER_PORT", "eighty")]);
        assert!(config.server_host.is_none());
        assert!(config.server_port.is_none());
    }

    #[test]
    fn lists_and_flags_are_parsed() {
        let config = env(&[
            ("CORS_ALLOWED_ORIGINS", "https://a.test, https://b.test"),
            ("RATE_LIMIT_ENABLED", "off"),
            ("RATE_LIMIT_MAX_REQUESTS", "250"),
        ]);
        assert_eq!(
            config.cors_allowed_origins,
            Some(vec![
                "https://a.test".to_string(),
                "https://b.test".to_string()
            ])
        );
        assert_eq!(config.rate_limit_enabled, Some(false));
        assert_eq!(config.rate_limit_max_requests, Some(250));
    }

    #[test]
    fn file_sections_are_optional() {
        let file: FileConfig =
            toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(file.server.port, Some(8080));
        assert!(file.auth.jwt_secret.is_none());
        assert!(file.rate_limit.window.is_none());
    }
}
