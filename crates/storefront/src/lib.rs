//! Bookstore storefront: client-side state and page views.
//!
//! [`Storefront`] is the entry point. It owns the session store, the
//! shared catalog cache, the cart, the theme preference and the notice
//! bus, and dispatches routes to the page views in [`views`]. The
//! `bookstore` binary drives it from a terminal.

pub mod app;
pub mod catalog;
pub mod checkout;
pub mod commands;
pub mod config;
pub mod error;
pub mod notice;
pub mod render;
pub mod scope;
pub mod session;
pub mod shell;
pub mod storage;
pub mod theme;
pub mod views;

#[cfg(test)]
mod test_support;

pub use app::Storefront;
pub use error::{StorefrontError, StorefrontResult};
