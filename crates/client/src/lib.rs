//! Bookstore REST client library.
//!
//! Provides the typed HTTP wrapper around the backend's endpoints, the
//! [`StoreBackend`] trait the storefront depends on, and client
//! configuration.

pub mod api;
pub mod backend;
pub mod config;

pub use api::{ApiError, BookstoreApi};
pub use backend::StoreBackend;
pub use config::ClientConfig;
