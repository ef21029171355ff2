//! Application configuration loaded from environment variables.

use std::path::PathBuf;

/// Server and storage configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `DATA_DIR`: directory holding the JSON stores (default: `"data"`)
/// - `RUST_LOG`: tracing filter directive
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: std::env::var_os("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join("books.json")
    }

    pub fn loans_path(&self) -> PathBuf {
        self.data_dir.join("loans.json")
    }

    pub fn notifications_path(&self) -> PathBuf {
        self.data_dir.join("notifications.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: PathBuf::from("data"),
            log_level: "library_lending=debug,tower_http=debug".to_string(),
        }
    }
}
