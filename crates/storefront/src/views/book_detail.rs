use bookstore_core::models::Book;
use bookstore_core::types::DbId;

use crate::app::Storefront;
use crate::scope::ViewScope;
use crate::views::Page;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const PRODUCT_LOAD_FAILED: &str = "Failed to load product";

#[derive(Debug, Clone, PartialEq)]
pub struct BookDetailPage {
    pub book: Book,
    pub in_cart: bool,
}

/// `/book/:id`. Served from the catalog cache when possible.
pub async fn load(app: &Storefront, scope: &ViewScope, book_id: DbId) -> Option<Page> {
    let book = match app.catalog().find(book_id).await {
        Some(book) => book,
        None => match scope.run(app.backend().get_book(book_id)).await? {
            Ok(book) => book,
            Err(e) if e.is_not_found() => {
                tracing::debug!(book_id, "Book not found");
                return Some(Page::Message(PRODUCT_NOT_FOUND.to_string()));
            }
            Err(e) => {
                tracing::warn!(book_id, error = %e, "Failed to load book");
                app.notices().error(PRODUCT_LOAD_FAILED);
                return Some(Page::Message(PRODUCT_LOAD_FAILED.to_string()));
            }
        },
    };

    let in_cart = app.cart().lock().await.contains(book.book_id);
    Some(Page::BookDetail(BookDetailPage { book, in_cart }))
}
