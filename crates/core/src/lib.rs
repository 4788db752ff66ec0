//! Bookstore storefront domain layer.
//!
//! Pure types and logic with no I/O: wire models, the cart reducer,
//! catalog filtering and sorting, the session state machine, the route
//! table and form validation. Shared by the REST client and the
//! storefront.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod types;
