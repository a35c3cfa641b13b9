// Configuration module entry point
// Layers defaults, an optional config file, environment variables and CLI arguments

mod types;

use std::net::{IpAddr, SocketAddr};

use crate::cli::Cli;
use crate::error::ShareError;

// Re-export public types
pub use types::{
    Config, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig, ServerConfig, ShareConfig,
};

/// Default config file name (any extension supported by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "fileshare";

/// Environment variable prefix, e.g. `FILESHARE_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "FILESHARE";

impl Config {
    /// Load configuration from `fileshare.*` in the working directory
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE, cli)
    }

    /// Load configuration from the given file path (without extension)
    ///
    /// Precedence, lowest first: defaults, file, environment, CLI arguments.
    pub fn load_from(config_path: &str, cli: &Cli) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("share.directory", "./file")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.backlog", 128)?
            .set_default("http.enable_cors", false)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option(
                "share.directory",
                cli.directory
                    .as_ref()
                    .map(|dir| dir.to_string_lossy().into_owned()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ShareError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ShareError::InvalidAddress(self.server.host.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
