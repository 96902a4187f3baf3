// Configuration types module
// Defines all configuration-related data structures and their defaults

use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 33333;
pub const DEFAULT_BACKLOG: u32 = 128;
pub const DEFAULT_BASE_DIR: &str = "/tmp";
pub const DEFAULT_VENDOR_FILE: &str = "/tmp/actimize-test.txt";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_ACCESS_LOG_FORMAT: &str = "combined";
pub const DEFAULT_KEEP_ALIVE_TIMEOUT: u64 = 75;
pub const DEFAULT_IO_TIMEOUT: u64 = 30;
pub const DEFAULT_SERVER_NAME: &str = "fileprobe";
pub const DEFAULT_MAX_BODY_SIZE: u64 = 1_048_576; // 1MB

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Listen backlog passed to `listen(2)`
    pub backlog: u32,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            workers: None,
        }
    }
}

/// File storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory that write/read names are resolved against
    pub base_dir: PathBuf,
    /// File the vendor smoke test appends to
    pub vendor_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            vendor_file: PathBuf::from(DEFAULT_VENDOR_FILE),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level: debug, info, warn, error
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            access_log: true,
            access_log_format: DEFAULT_ACCESS_LOG_FORMAT.to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: DEFAULT_KEEP_ALIVE_TIMEOUT,
            read_timeout: DEFAULT_IO_TIMEOUT,
            write_timeout: DEFAULT_IO_TIMEOUT,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    pub server_name: String,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}
