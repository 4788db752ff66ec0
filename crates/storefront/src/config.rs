use std::path::PathBuf;

use bookstore_client::ClientConfig;

/// Name of the persisted-state file inside the data directory.
pub const STORAGE_FILE: &str = "storage.json";

/// Log output format for the terminal binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Storefront configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost:8000`.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST client settings (base URL, timeout).
    pub client: ClientConfig,
    /// Directory holding persisted state (default: `./.bookstore`).
    pub data_dir: PathBuf,
    /// Log output format (default: text).
    pub log_format: LogFormat,
}

impl StorefrontConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                       |
    /// |----------------------------------|-------------------------------|
    /// | `BOOKSTORE_API_URL`              | `http://localhost:8000/api/`  |
    /// | `BOOKSTORE_REQUEST_TIMEOUT_SECS` | unset (no timeout)            |
    /// | `BOOKSTORE_DATA_DIR`             | `./.bookstore`                |
    /// | `LOG_FORMAT`                     | `text`                        |
    pub fn from_env() -> Self {
        let data_dir = std::env::var("BOOKSTORE_DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".bookstore"));

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(v) => parse_log_format(&v).expect("LOG_FORMAT must be 'text' or 'json'"),
            Err(_) => LogFormat::Text,
        };

        Self {
            client: ClientConfig::from_env(),
            data_dir,
            log_format,
        }
    }

    /// Full path of the persisted-state file.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }
}

fn parse_log_format(raw: &str) -> Option<LogFormat> {
    match raw.trim().to_lowercase().as_str() {
        "" | "text" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}
