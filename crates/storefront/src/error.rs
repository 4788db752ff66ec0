use bookstore_client::ApiError;
use bookstore_core::error::CoreError;

/// Storefront-level error type.
///
/// Wraps [`CoreError`] for domain errors and [`ApiError`] for backend
/// failures, and adds persisted-state I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    /// A domain-level error from `bookstore_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend or transport error from `bookstore_client`.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing persisted state failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Convenience alias for storefront operations.
pub type StorefrontResult<T> = Result<T, StorefrontError>;

impl StorefrontError {
    /// Text for a transient error notice.
    ///
    /// Domain errors show their own message; backend errors show the
    /// backend's message when it sent one and `fallback` otherwise.
    pub fn notice_text(&self, fallback: &str) -> String {
        match self {
            StorefrontError::Core(core) => core.user_message(),
            StorefrontError::Api(api) => api
                .backend_message()
                .map_or_else(|| fallback.to_string(), str::to_string),
            StorefrontError::Storage(_) => fallback.to_string(),
        }
    }
}

impl From<std::io::Error> for StorefrontError {
    fn from(e: std::io::Error) -> Self {
        StorefrontError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for StorefrontError {
    fn from(e: serde_json::Error) -> Self {
        StorefrontError::Storage(e.to_string())
    }
}
