//! Page views.
//!
//! Each view loads what its page needs inside a [`ViewScope`] and returns
//! a [`Page`] view-model, or `None` when the scope was cancelled before
//! the data arrived.
//!
//! [`ViewScope`]: crate::scope::ViewScope

pub mod admin;
pub mod book_detail;
pub mod book_form;
pub mod catalog;
pub mod listing;
pub mod orders;

use bookstore_core::routes::Route;

pub use admin::AdminPage;
pub use book_detail::BookDetailPage;
pub use book_form::BookFormPage;
pub use catalog::{CatalogEntry, CatalogPage};
pub use listing::{ListingKind, ListingPage};
pub use orders::OrdersPage;

/// What a view produced for the current route.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Catalog(CatalogPage),
    BookDetail(BookDetailPage),
    Listing(ListingPage),
    Orders(OrdersPage),
    Admin(AdminPage),
    BookForm(BookFormPage),
    /// A static message in place of the page body.
    Message(String),
    /// The view sends the user to another route instead.
    Redirect(Route),
}
