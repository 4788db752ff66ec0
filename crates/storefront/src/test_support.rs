//! In-memory [`StoreBackend`] and fixtures for storefront tests.
//!
//! Also compiled into the integration tests via `#[path]`, so only
//! external crate paths are used here.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bookstore_client::{ApiError, StoreBackend};
use bookstore_core::models::{
    Author, Book, BookForm, Genre, LoginForm, NewOrder, NewUser, Order, OrderItem, Publisher,
    RelationChoice, SpendingRange, SpendingReport, User, UserUpdate,
};
use bookstore_core::types::DbId;

/// Password every fixture user logs in with.
pub const PASSWORD: &str = "secret";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn user(id: DbId, is_admin: bool) -> User {
    let (first, last) = match id {
        1 => ("Ada", "Lovelace"),
        2 => ("Alan", "Turing"),
        _ => ("Test", "User"),
    };
    let email = match id {
        1 => "ada@example.com".to_string(),
        2 => "alan@example.com".to_string(),
        n => format!("user{n}@example.com"),
    };
    User {
        user_id: id,
        first_name: first.into(),
        last_name: last.into(),
        email: Some(email),
        phone: Some("555-0100".into()),
        address: Some("12 Analytical St".into()),
        is_admin,
    }
}

pub fn genre(id: DbId, name: &str) -> Genre {
    Genre {
        genre_id: id,
        genre_name: name.into(),
    }
}

pub fn author(id: DbId, first: &str, last: &str) -> Author {
    Author {
        author_id: id,
        first_name: first.into(),
        last_name: last.into(),
        birthdate: None,
    }
}

pub fn publisher(id: DbId, name: &str) -> Publisher {
    Publisher {
        publisher_id: id,
        publisher_name: name.into(),
        address: Some("1 Press Rd".into()),
        phone: None,
        email: None,
    }
}

pub fn book(id: DbId, title: &str, price: f64) -> Book {
    Book {
        book_id: id,
        title: title.into(),
        price,
        cover: None,
        cover_url: None,
        publication_date: None,
        author: Some(author(1, "Ivan", "Franko")),
        genre: Some(genre(1, "Drama")),
        publisher: Some(publisher(1, "Folio")),
    }
}

/// Three books spanning two genres, authors and publishers.
pub fn sample_catalog() -> Vec<Book> {
    let mut poems = book(2, "apple poems", 100.0);
    poems.author = Some(author(2, "Lesya", "Ukrainka"));
    poems.genre = Some(genre(2, "Poetry"));
    poems.publisher = Some(publisher(2, "Smoloskyp"));

    vec![
        book(1, "Zakhar Berkut", 300.0),
        poems,
        book(3, "Moses", 200.0),
    ]
}

// ---------------------------------------------------------------------------
// FakeBackend
// ---------------------------------------------------------------------------

/// Scriptable in-memory backend.
///
/// Every operation is counted under its trait method name; [`fail`]
/// makes that operation return a 503 with an empty body.
///
/// [`fail`]: FakeBackend::fail
#[derive(Default)]
pub struct FakeBackend {
    pub books: Mutex<Vec<Book>>,
    pub users: Mutex<Vec<User>>,
    pub orders: Mutex<Vec<Order>>,
    pub genres: Mutex<Vec<Genre>>,
    pub authors: Mutex<Vec<Author>>,
    pub publishers: Mutex<Vec<Publisher>>,
    pub submitted_orders: Mutex<Vec<NewOrder>>,
    pub submitted_books: Mutex<Vec<(Option<DbId>, BookForm)>>,
    pub updated_users: Mutex<Vec<(DbId, UserUpdate)>>,
    session: Mutex<Option<User>>,
    failures: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeBackend {
    pub fn with_books(books: Vec<Book>) -> Self {
        let backend = Self::default();
        *backend.books.lock().unwrap() = books;
        backend
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let backend = Self::default();
        *backend.users.lock().unwrap() = users;
        backend
    }

    /// Catalog, reference data and two users (1 = customer, 2 = admin).
    pub fn populated() -> Self {
        let backend = Self::with_books(sample_catalog());
        *backend.users.lock().unwrap() = vec![user(1, false), user(2, true)];
        *backend.genres.lock().unwrap() = vec![genre(1, "Drama"), genre(2, "Poetry")];
        *backend.authors.lock().unwrap() =
            vec![author(1, "Ivan", "Franko"), author(2, "Lesya", "Ukrainka")];
        *backend.publishers.lock().unwrap() =
            vec![publisher(1, "Folio"), publisher(2, "Smoloskyp")];
        backend
    }

    pub fn fail(&self, op: &'static str) {
        self.failures.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failures.lock().unwrap().remove(op);
    }

    /// Make `op` wait for `delay` before answering.
    pub fn delay(&self, op: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(op, delay);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn set_session(&self, user: Option<User>) {
        *self.session.lock().unwrap() = user;
    }

    pub fn add_order(&self, order: Order) {
        self.orders.lock().unwrap().push(order);
    }

    async fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        let delay = self.delays.lock().unwrap().get(op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().contains(op) {
            return Err(status(503, ""));
        }
        Ok(())
    }

    fn book_from_form(&self, book_id: DbId, form: &BookForm, base: Option<Book>) -> Book {
        let mut book = base.unwrap_or_else(|| book(book_id, "", 0.0));
        if !form.title.trim().is_empty() {
            book.title = form.title.trim().to_string();
        }
        if let Ok(Some(price)) = form.parsed_price() {
            book.price = price;
        }
        if form.publication_date.is_some() {
            book.publication_date = form.publication_date;
        }
        match &form.genre {
            RelationChoice::Existing(id) => {
                book.genre = self.genres.lock().unwrap().iter().find(|g| g.genre_id == *id).cloned()
            }
            RelationChoice::New(draft) => book.genre = Some(genre(100, &draft.genre_name)),
            RelationChoice::Unset => {}
        }
        match &form.author {
            RelationChoice::Existing(id) => {
                book.author = self.authors.lock().unwrap().iter().find(|a| a.author_id == *id).cloned()
            }
            RelationChoice::New(draft) => {
                book.author = Some(author(100, &draft.first_name, &draft.last_name))
            }
            RelationChoice::Unset => {}
        }
        match &form.publisher {
            RelationChoice::Existing(id) => {
                book.publisher = self
                    .publishers
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|p| p.publisher_id == *id)
                    .cloned()
            }
            RelationChoice::New(draft) => book.publisher = Some(publisher(100, &draft.publisher_name)),
            RelationChoice::Unset => {}
        }
        book
    }
}

fn status(code: u16, message: &str) -> ApiError {
    ApiError::Status {
        status: code,
        message: message.to_string(),
    }
}

fn not_found() -> ApiError {
    status(404, "Not found.")
}

#[async_trait]
impl StoreBackend for FakeBackend {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.enter("list_books").await?;
        Ok(self.books.lock().unwrap().clone())
    }

    async fn get_book(&self, book_id: DbId) -> Result<Book, ApiError> {
        self.enter("get_book").await?;
        self.books
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.book_id == book_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_book(&self, form: &BookForm) -> Result<Book, ApiError> {
        self.enter("create_book").await?;
        self.submitted_books.lock().unwrap().push((None, form.clone()));
        let next_id = self.books.lock().unwrap().iter().map(|b| b.book_id).max().unwrap_or(0) + 1;
        let created = self.book_from_form(next_id, form, None);
        self.books.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, book_id: DbId, form: &BookForm) -> Result<Book, ApiError> {
        self.enter("update_book").await?;
        self.submitted_books.lock().unwrap().push((Some(book_id), form.clone()));
        let existing = self
            .books
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.book_id == book_id)
            .cloned()
            .ok_or_else(not_found)?;
        let updated = self.book_from_form(book_id, form, Some(existing));
        let mut books = self.books.lock().unwrap();
        if let Some(slot) = books.iter_mut().find(|b| b.book_id == book_id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_book(&self, book_id: DbId) -> Result<(), ApiError> {
        self.enter("delete_book").await?;
        let mut books = self.books.lock().unwrap();
        let before = books.len();
        books.retain(|b| b.book_id != book_id);
        if books.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, ApiError> {
        self.enter("list_genres").await?;
        Ok(self.genres.lock().unwrap().clone())
    }

    async fn list_authors(&self) -> Result<Vec<Author>, ApiError> {
        self.enter("list_authors").await?;
        Ok(self.authors.lock().unwrap().clone())
    }

    async fn list_publishers(&self) -> Result<Vec<Publisher>, ApiError> {
        self.enter("list_publishers").await?;
        Ok(self.publishers.lock().unwrap().clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.enter("list_users").await?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, ApiError> {
        self.enter("create_user").await?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.as_deref() == Some(new_user.email.as_str())) {
            return Err(status(400, "email: user with this email already exists."));
        }
        let created = User {
            user_id: users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: Some(new_user.email.clone()),
            phone: Some(new_user.phone.clone()),
            address: Some(new_user.address.clone()),
            is_admin: false,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, user_id: DbId, update: &UserUpdate) -> Result<User, ApiError> {
        self.enter("update_user").await?;
        self.updated_users.lock().unwrap().push((user_id, update.clone()));
        let mut users = self.users.lock().unwrap();
        let target = users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(not_found)?;
        target.first_name = update.first_name.clone();
        target.last_name = update.last_name.clone();
        target.email = update.email.clone();
        target.phone = update.phone.clone();
        target.address = update.address.clone();
        Ok(target.clone())
    }

    async fn delete_user(&self, user_id: DbId) -> Result<(), ApiError> {
        self.enter("delete_user").await?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.user_id != user_id);
        if users.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn login(&self, form: &LoginForm) -> Result<User, ApiError> {
        self.enter("login").await?;
        let found = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_deref() == Some(form.email.as_str()))
            .cloned();
        match found {
            Some(user) if form.password == PASSWORD => {
                self.set_session(Some(user.clone()));
                Ok(user)
            }
            Some(_) => Err(status(401, "Wrong password")),
            None => Err(status(404, "User not found")),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.enter("logout").await?;
        self.set_session(None);
        Ok(())
    }

    async fn check_auth(&self) -> Result<User, ApiError> {
        self.enter("check_auth").await?;
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| status(401, "Didn't authorize"))
    }

    async fn list_orders(&self, user_id: DbId) -> Result<Vec<Order>, ApiError> {
        self.enter("list_orders").await?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user.as_ref().is_some_and(|u| u.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.enter("create_order").await?;
        self.submitted_orders.lock().unwrap().push(order.clone());

        let books = self.books.lock().unwrap().clone();
        let mut total = 0.0;
        let mut items = Vec::new();
        for (idx, item) in order.order_items.iter().enumerate() {
            let book = books.iter().find(|b| b.book_id == item.book_id).cloned();
            total += book.as_ref().map_or(0.0, |b| b.price) * f64::from(item.quantity);
            items.push(OrderItem {
                order_item_id: idx as DbId + 1,
                book,
                quantity: item.quantity as i32,
            });
        }

        let owner = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == order.user_id)
            .cloned();
        let mut orders = self.orders.lock().unwrap();
        let created = Order {
            order_id: orders.len() as DbId + 1,
            user: owner,
            order_date: order.order_date,
            total_amount: Some(total),
            order_items: items,
        };
        orders.push(created.clone());
        Ok(created)
    }

    async fn calculate_spending(
        &self,
        user_id: DbId,
        range: SpendingRange,
    ) -> Result<SpendingReport, ApiError> {
        self.enter("calculate_spending").await?;
        let total_spent = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user.as_ref().is_some_and(|u| u.user_id == user_id))
            .filter(|o| o.order_date >= range.start && o.order_date <= range.end)
            .filter_map(|o| o.total_amount)
            .sum();
        Ok(SpendingReport {
            user_id,
            total_spent,
        })
    }
}
