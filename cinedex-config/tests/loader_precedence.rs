use std::{collections::HashMap, fs, time::Duration};

use cinedex_config::{ConfigLoadError, ConfigLoader, EnvConfig};
use tempfile::TempDir;

const SECRET: &str = "0123456789abcdef0123456789abcdef";
const PEPPER: &str = "fedcba9876543210fedcba9876543210";

fn env(pairs: &[(&str, &str)]) -> EnvConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvConfig::from_lookup(|name| vars.get(name).cloned())
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("cinedex.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn environment_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[auth]
jwt_secret = "{SECRET}"
password_pepper = "{PEPPER}"
token_ttl = "2h"

[rate_limit]
window = "5m"
max_requests = 20
"#
        ),
    );

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env(&[
            ("SERVER_PORT", "9090"),
            ("RATE_LIMIT_MAX_REQUESTS", "50"),
        ]))
        .expect("config loads");
    let config = load.config;

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.auth.token_ttl, Duration::from_secs(2 * 60 * 60));
    assert_eq!(config.rate_limit.window, Duration::from_secs(5 * 60));
    assert_eq!(config.rate_limit.max_requests, 50);
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
}

#[test]
fn defaults_apply_without_file_or_environment() {
    let load = ConfigLoader::new()
        .load_with_env(env(&[]))
        .expect("config loads");
    let config = load.config;

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.rate_limit.window, Duration::from_secs(15 * 60));
    assert_eq!(config.rate_limit.max_requests, 100);
    assert_eq!(config.auth.token_ttl, Duration::from_secs(60 * 60));
    assert_eq!(config.query.default_limit, 10);
    assert_eq!(config.query.default_sort, "-created_at");
    assert!(load.warnings.mentions("No cinedex.toml"));
    assert!(load.warnings.mentions("JWT_SECRET"));
}

#[test]
fn config_path_from_environment_is_used() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[query]\ndefault_limit = 25\ndefault_sort = \"title\"\n",
    );

    let load = ConfigLoader::new()
        .load_with_env(env(&[("CINEDEX_CONFIG", path.to_str().unwrap())]))
        .expect("config loads");

    assert_eq!(load.config.query.default_limit, 25);
    assert_eq!(load.config.query.default_sort, "title");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::new()
        .with_config_path(dir.path().join("absent.toml"))
        .load_with_env(env(&[]));

    assert!(matches!(result, Err(ConfigLoadError::MissingConfig { .. })));
}

#[test]
fn malformed_values_are_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server\nport = 1");
    let result = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env(&[]));
    assert!(matches!(result, Err(ConfigLoadError::Parse { .. })));

    let result = ConfigLoader::new().load_with_env(env(&[("JWT_TTL", "soon")]));
    assert!(matches!(
        result,
        Err(ConfigLoadError::InvalidDuration { field: "JWT_TTL", .. })
    ));

    let result = ConfigLoader::new()
        .load_with_env(env(&[("DATABASE_URL", "not a url")]));
    assert!(matches!(
        result,
        Err(ConfigLoadError::InvalidDatabaseUrl { .. })
    ));
}

#[test]
fn guard_rails_reject_short_secrets() {
    let result =
        ConfigLoader::new().load_with_env(env(&[("JWT_SECRET", "tiny")]));
    assert!(matches!(result, Err(ConfigLoadError::GuardRail(_))));
}
