use bookstore_core::catalog::CatalogQuery;
use bookstore_core::models::Book;

use crate::app::Storefront;
use crate::scope::ViewScope;
use crate::views::Page;

/// One row of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub book: Book,
    pub in_cart: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub query: CatalogQuery,
    pub entries: Vec<CatalogEntry>,
}

/// `/`: the filtered, sorted catalog.
///
/// A failed fetch keeps showing the last catalog that was loaded (empty
/// if none was).
pub async fn load(app: &Storefront, scope: &ViewScope) -> Option<Page> {
    let books = match scope.run(app.catalog().books()).await? {
        Ok(books) => books,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load books");
            app.notices().error("Failed to load books");
            app.catalog().cached().await.unwrap_or_default()
        }
    };

    let query = app.query().await;
    let cart = app.cart().lock().await;
    let entries = query
        .apply(&books)
        .into_iter()
        .map(|book| CatalogEntry {
            in_cart: cart.contains(book.book_id),
            book: book.clone(),
        })
        .collect();

    Some(Page::Catalog(CatalogPage { query, entries }))
}
