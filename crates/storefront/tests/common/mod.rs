#![allow(dead_code)]

use std::sync::Arc;

use bookstore_storefront::notice::Notice;
use bookstore_storefront::storage::{MemoryStorage, Storage};
use bookstore_storefront::Storefront;
use tokio::sync::broadcast;

#[path = "../../src/test_support.rs"]
mod fake;

pub use fake::*;

/// A storefront over `backend` with fresh in-memory storage.
pub fn storefront(backend: &Arc<FakeBackend>) -> Storefront {
    storefront_with_storage(backend, Arc::new(MemoryStorage::new()))
}

pub fn storefront_with_storage(backend: &Arc<FakeBackend>, storage: Arc<dyn Storage>) -> Storefront {
    Storefront::new(backend.clone(), storage)
}

/// Every notice message received so far.
pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        messages.push(notice.message);
    }
    messages
}
