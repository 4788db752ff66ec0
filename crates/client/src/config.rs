use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// REST client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, always ending in `/`.
    pub api_url: String,
    /// Per-request timeout. `None` means requests wait indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                       |
    /// |----------------------------------|-------------------------------|
    /// | `BOOKSTORE_API_URL`              | `http://localhost:8000/api/`  |
    /// | `BOOKSTORE_REQUEST_TIMEOUT_SECS` | unset (no timeout)            |
    pub fn from_env() -> Self {
        let api_url = std::env::var("BOOKSTORE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into());

        let request_timeout = std::env::var("BOOKSTORE_REQUEST_TIMEOUT_SECS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .expect("BOOKSTORE_REQUEST_TIMEOUT_SECS must be a valid u64")
            })
            .map(Duration::from_secs);

        Self::new(api_url, request_timeout)
    }

    pub fn new(api_url: impl Into<String>, request_timeout: Option<Duration>) -> Self {
        Self {
            api_url: normalize_base(api_url.into()),
            request_timeout,
        }
    }
}

/// Ensure the base URL ends with exactly one `/` so endpoint paths can be
/// appended directly.
fn normalize_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url.push('/');
    url
}
