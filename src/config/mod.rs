// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;
use types::{
    DEFAULT_ACCESS_LOG_FORMAT, DEFAULT_BACKLOG, DEFAULT_BASE_DIR, DEFAULT_HOST,
    DEFAULT_IO_TIMEOUT, DEFAULT_KEEP_ALIVE_TIMEOUT, DEFAULT_LOG_LEVEL, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_PORT, DEFAULT_SERVER_NAME, DEFAULT_VENDOR_FILE,
};

/// Default config file (without extension)
const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `FILEPROBE__STORAGE__BASE_DIR=/data`
const ENV_PREFIX: &str = "FILEPROBE";

impl Config {
    /// Load configuration from the path given as first CLI argument,
    /// falling back to `config.toml` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (extension optional).
    /// The file is optional; environment variables override it, and
    /// built-in defaults fill whatever neither sets.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.backlog", i64::from(DEFAULT_BACKLOG))?
            .set_default("storage.base_dir", DEFAULT_BASE_DIR)?
            .set_default("storage.vendor_file", DEFAULT_VENDOR_FILE)?
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", DEFAULT_ACCESS_LOG_FORMAT)?
            .set_default("performance.keep_alive_timeout", DEFAULT_KEEP_ALIVE_TIMEOUT)?
            .set_default("performance.read_timeout", DEFAULT_IO_TIMEOUT)?
            .set_default("performance.write_timeout", DEFAULT_IO_TIMEOUT)?
            .set_default("http.server_name", DEFAULT_SERVER_NAME)?
            .set_default("http.max_body_size", DEFAULT_MAX_BODY_SIZE)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
