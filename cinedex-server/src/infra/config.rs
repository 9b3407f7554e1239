//! Server view of the shared configuration crate.

pub use cinedex_config::{
    AuthConfig, Config, ConfigLoad, ConfigLoadError, ConfigLoader,
    ConfigWarnings, CorsConfig, HstsSettings, RateLimitConfig, ServerConfig,
};

/// Command-line values that win over every other configuration source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl CliOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
