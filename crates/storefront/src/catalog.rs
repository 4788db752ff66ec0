//! Shared catalog cache.
//!
//! The backend's `books/` endpoint always returns the whole catalog, so
//! the storefront fetches it once and derives every listing (search,
//! genre, author, publisher) from the cached copy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bookstore_client::{ApiError, StoreBackend};
use bookstore_core::models::Book;
use bookstore_core::types::DbId;
use tokio::sync::RwLock;

pub struct CatalogCache {
    backend: Arc<dyn StoreBackend>,
    books: RwLock<Option<Arc<Vec<Book>>>>,
    /// Bumped under the write lock whenever the cached copy is dropped or
    /// edited; a fetch that started under an older generation is not
    /// installed.
    generation: AtomicU64,
}

impl CatalogCache {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            books: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// The catalog in fetch order, fetching it on first use.
    pub async fn books(&self) -> Result<Arc<Vec<Book>>, ApiError> {
        if let Some(books) = self.books.read().await.as_ref() {
            return Ok(Arc::clone(books));
        }
        self.refresh().await
    }

    /// Re-fetch unconditionally. On failure the previous copy is kept.
    ///
    /// When the cache is invalidated or edited while the fetch is in
    /// flight, the result is returned but not cached.
    pub async fn refresh(&self) -> Result<Arc<Vec<Book>>, ApiError> {
        let started = self.generation.load(Ordering::Acquire);
        let fetched = Arc::new(self.backend.list_books().await?);

        let mut guard = self.books.write().await;
        if self.generation.load(Ordering::Acquire) == started {
            tracing::debug!(count = fetched.len(), "Catalog fetched");
            *guard = Some(Arc::clone(&fetched));
        } else {
            tracing::debug!(count = fetched.len(), "Catalog changed during fetch, not caching");
        }
        Ok(fetched)
    }

    /// Whatever is cached right now, without fetching.
    pub async fn cached(&self) -> Option<Arc<Vec<Book>>> {
        self.books.read().await.clone()
    }

    /// A cached book by id. Never fetches.
    pub async fn find(&self, book_id: DbId) -> Option<Book> {
        self.books
            .read()
            .await
            .as_ref()
            .and_then(|books| books.iter().find(|b| b.book_id == book_id).cloned())
    }

    /// Drop one book from the cached copy (after an admin delete).
    pub async fn remove(&self, book_id: DbId) {
        let mut guard = self.books.write().await;
        if let Some(books) = guard.as_ref() {
            let kept: Vec<Book> = books
                .iter()
                .filter(|b| b.book_id != book_id)
                .cloned()
                .collect();
            *guard = Some(Arc::new(kept));
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Forget the cached copy; the next [`books`](Self::books) re-fetches.
    pub async fn invalidate(&self) {
        let mut guard = self.books.write().await;
        *guard = None;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
