use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::debug;
use url::Url;

use cinedex_core::query::QueryConfig;

use crate::{
    constants::DEFAULT_CONFIG_LOCATIONS,
    models::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        HstsSettings, RateLimitConfig, SecurityConfig, ServerConfig,
        sources::{EnvConfig, FileConfig},
    },
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

/// Composes a [`Config`] from `.env`, a TOML file and the environment.
///
/// Environment values win over file values, which win over defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env` into the process environment, then compose from the
    /// process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| ()),
            None => dotenvy::dotenv().map(|_| ()),
        };
        // A missing file is not an error.
        let env_file_loaded = match loaded {
            Ok(()) => true,
            Err(dotenvy::Error::Io(_)) => false,
            Err(err) => return Err(err.into()),
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an already gathered environment. The process
    /// environment is not consulted.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let requested =
            self.options.config_path.as_ref().or(env.config_path.as_ref());
        let (path, explicit) = match requested {
            Some(path) => (path.clone(), true),
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path, false),
                None => return Ok((None, None)),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No cinedex.toml detected; falling back to environment variables",
            "Create config/cinedex.toml or point CINEDEX_CONFIG at a \
             configuration file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
        cors: file_cors,
        rate_limit: file_rate_limit,
        security: file_security,
        query: file_query,
    } = file_config.unwrap_or_default();

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or(server_defaults.host),
        port: env
            .server_port
            .or(file_server.port)
            .unwrap_or(server_defaults.port),
        request_timeout: duration(
            "REQUEST_TIMEOUT",
            env.request_timeout.or(file_server.request_timeout),
        )?
        .unwrap_or(server_defaults.request_timeout),
    };

    let database_url = env.database_url.or(file_database.url);
    if let Some(url) = &database_url {
        Url::parse(url)
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    }
    let database = DatabaseConfig {
        url: database_url,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DatabaseConfig::default().max_connections),
    };

    let auth_defaults = AuthConfig::default();
    let auth = AuthConfig {
        jwt_secret: env
            .jwt_secret
            .or(file_auth.jwt_secret)
            .unwrap_or(auth_defaults.jwt_secret),
        retired_jwt_secrets: env
            .retired_jwt_secrets
            .or(file_auth.retired_jwt_secrets)
            .unwrap_or_default(),
        token_ttl: duration("JWT_TTL", env.jwt_ttl.or(file_auth.token_ttl))?
            .unwrap_or(auth_defaults.token_ttl),
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .unwrap_or(auth_defaults.password_pepper),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        allow_credentials: env
            .cors_allow_credentials
            .or(file_cors.allow_credentials)
            .unwrap_or(false),
    };

    let limit_defaults = RateLimitConfig::default();
    let rate_limit = RateLimitConfig {
        enabled: env
            .rate_limit_enabled
            .or(file_rate_limit.enabled)
            .unwrap_or(limit_defaults.enabled),
        window: duration(
            "RATE_LIMIT_WINDOW",
            env.rate_limit_window.or(file_rate_limit.window),
        )?
        .unwrap_or(limit_defaults.window),
        max_requests: env
            .rate_limit_max_requests
            .or(file_rate_limit.max_requests)
            .unwrap_or(limit_defaults.max_requests),
    };

    let hsts_defaults = HstsSettings::default();
    let security = SecurityConfig {
        hsts: HstsSettings {
            max_age: env
                .hsts_max_age
                .or(file_security.hsts.max_age)
                .unwrap_or(hsts_defaults.max_age),
            include_subdomains: file_security
                .hsts
                .include_subdomains
                .unwrap_or(hsts_defaults.include_subdomains),
            preload: file_security
                .hsts
                .preload
                .unwrap_or(hsts_defaults.preload),
        },
    };

    let query_defaults = QueryConfig::default();
    let query = QueryConfig {
        default_page: file_query
            .default_page
            .unwrap_or(query_defaults.default_page),
        default_limit: env
            .query_default_limit
            .or(file_query.default_limit)
            .unwrap_or(query_defaults.default_limit),
        default_sort: file_query
            .default_sort
            .unwrap_or(query_defaults.default_sort),
    };

    let config = Config {
        server,
        database,
        auth,
        cors,
        rate_limit,
        security,
        query,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config)?);

    Ok((config, warnings))
}

fn duration(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<Duration>, ConfigLoadError> {
    raw.map(|raw| {
        humantime::parse_duration(raw.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration { field, source }
        })
    })
    .transpose()
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid duration for {field}")]
    InvalidDuration {
        field: &'static str,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
