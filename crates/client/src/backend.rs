//! The seam between the storefront and the REST backend.
//!
//! Storefront state containers and page views talk to a
//! [`StoreBackend`] rather than to [`BookstoreApi`] directly, so they can
//! be driven by an in-memory backend in tests.

use async_trait::async_trait;
use bookstore_core::models::{
    Author, Book, BookForm, Genre, LoginForm, NewOrder, NewUser, Order, Publisher, SpendingRange,
    SpendingReport, User, UserUpdate,
};
use bookstore_core::types::DbId;

use crate::api::{ApiError, BookstoreApi};

/// Every backend operation the storefront consumes.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;
    async fn get_book(&self, book_id: DbId) -> Result<Book, ApiError>;
    async fn create_book(&self, form: &BookForm) -> Result<Book, ApiError>;
    async fn update_book(&self, book_id: DbId, form: &BookForm) -> Result<Book, ApiError>;
    async fn delete_book(&self, book_id: DbId) -> Result<(), ApiError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, ApiError>;
    async fn list_authors(&self) -> Result<Vec<Author>, ApiError>;
    async fn list_publishers(&self) -> Result<Vec<Publisher>, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError>;
    async fn update_user(&self, user_id: DbId, update: &UserUpdate) -> Result<User, ApiError>;
    async fn delete_user(&self, user_id: DbId) -> Result<(), ApiError>;

    async fn login(&self, form: &LoginForm) -> Result<User, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn check_auth(&self) -> Result<User, ApiError>;

    async fn list_orders(&self, user_id: DbId) -> Result<Vec<Order>, ApiError>;
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError>;
    async fn calculate_spending(
        &self,
        user_id: DbId,
        range: SpendingRange,
    ) -> Result<SpendingReport, ApiError>;
}

#[async_trait]
impl StoreBackend for BookstoreApi {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        BookstoreApi::list_books(self).await
    }

    async fn get_book(&self, book_id: DbId) -> Result<Book, ApiError> {
        BookstoreApi::get_book(self, book_id).await
    }

    async fn create_book(&self, form: &BookForm) -> Result<Book, ApiError> {
        BookstoreApi::create_book(self, form).await
    }

    async fn update_book(&self, book_id: DbId, form: &BookForm) -> Result<Book, ApiError> {
        BookstoreApi::update_book(self, book_id, form).await
    }

    async fn delete_book(&self, book_id: DbId) -> Result<(), ApiError> {
        BookstoreApi::delete_book(self, book_id).await
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, ApiError> {
        BookstoreApi::list_genres(self).await
    }

    async fn list_authors(&self) -> Result<Vec<Author>, ApiError> {
        BookstoreApi::list_authors(self).await
    }

    async fn list_publishers(&self) -> Result<Vec<Publisher>, ApiError> {
        BookstoreApi::list_publishers(self).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        BookstoreApi::list_users(self).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        BookstoreApi::create_user(self, user).await
    }

    async fn update_user(&self, user_id: DbId, update: &UserUpdate) -> Result<User, ApiError> {
        BookstoreApi::update_user(self, user_id, update).await
    }

    async fn delete_user(&self, user_id: DbId) -> Result<(), ApiError> {
        BookstoreApi::delete_user(self, user_id).await
    }

    async fn login(&self, form: &LoginForm) -> Result<User, ApiError> {
        BookstoreApi::login(self, form).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        BookstoreApi::logout(self).await
    }

    async fn check_auth(&self) -> Result<User, ApiError> {
        BookstoreApi::check_auth(self).await
    }

    async fn list_orders(&self, user_id: DbId) -> Result<Vec<Order>, ApiError> {
        BookstoreApi::list_orders(self, user_id).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        BookstoreApi::create_order(self, order).await
    }

    async fn calculate_spending(
        &self,
        user_id: DbId,
        range: SpendingRange,
    ) -> Result<SpendingReport, ApiError> {
        BookstoreApi::calculate_spending(self, user_id, range).await
    }
}
