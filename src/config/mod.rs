// Configuration module entry point
// Fixed listening parameters plus layered settings for the ambient concerns

mod state;
mod types;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig};

/// Listening port. Not configurable.
pub const PORT: u16 = 8000;

/// Wildcard bind address (all IPv4 interfaces)
pub const BIND_HOST: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Index files tried, in order, when a directory is requested
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Optional settings file looked up in the working directory.
///
/// Named in full: the working directory also holds the extensionless
/// `asset-server` executable, which a stem lookup would pick up first.
pub const CONFIG_FILE: &str = "asset-server.toml";

/// Environment variable prefix, e.g. `ASSET_SERVER_LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "ASSET_SERVER";

pub fn default_server_name() -> String {
    format!("asset-server/{}", env!("CARGO_PKG_VERSION"))
}

/// Address the server listens on
pub fn listen_addr() -> SocketAddr {
    SocketAddr::from((BIND_HOST, PORT))
}

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from the TOML file at `config_path`
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.connection_timeout", 30)?
            .set_default("http.server_name", default_server_name())?
            .add_source(
                config::File::from(config_path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
