//! The storefront container.
//!
//! [`Storefront`] owns every piece of client state (session, catalog
//! cache, cart, theme, listing query, notices) and the cancellation tree
//! for page views. It is constructed explicitly and passed by reference;
//! nothing is global.

use std::path::Path;
use std::sync::Arc;

use bookstore_client::{BookstoreApi, StoreBackend};
use bookstore_core::cart::Cart;
use bookstore_core::catalog::{parse_price_bound, CatalogQuery, SortCriterion};
use bookstore_core::models::{
    Book, BookForm, CoverFile, LoginForm, NewUser, Order, RegistrationForm, SpendingReport, User,
};
use bookstore_core::routes::Route;
use bookstore_core::session::SessionState;
use bookstore_core::types::DbId;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::checkout::{self, ORDER_FAILED, ORDER_PLACED};
use crate::config::StorefrontConfig;
use crate::error::{StorefrontError, StorefrontResult};
use crate::notice::NoticeBus;
use crate::scope::ViewScope;
use crate::session::{SessionStore, LOGIN_FALLBACK, REGISTRATION_FALLBACK};
use crate::storage::{FileStorage, Storage};
use crate::theme::{Theme, ThemeStore};
use crate::views::{self, ListingKind, Page};

pub struct Storefront {
    backend: Arc<dyn StoreBackend>,
    session: SessionStore,
    catalog: crate::catalog::CatalogCache,
    cart: Mutex<Cart>,
    theme: ThemeStore,
    notices: NoticeBus,
    query: RwLock<CatalogQuery>,
    route: RwLock<Route>,
    root: CancellationToken,
    active_scope: Mutex<Option<ViewScope>>,
}

impl Storefront {
    pub fn new(backend: Arc<dyn StoreBackend>, storage: Arc<dyn Storage>) -> Self {
        Self {
            session: SessionStore::new(Arc::clone(&backend), Arc::clone(&storage)),
            catalog: crate::catalog::CatalogCache::new(Arc::clone(&backend)),
            theme: ThemeStore::new(storage),
            backend,
            cart: Mutex::new(Cart::new()),
            notices: NoticeBus::default(),
            query: RwLock::new(CatalogQuery::default()),
            route: RwLock::new(Route::Catalog),
            root: CancellationToken::new(),
            active_scope: Mutex::new(None),
        }
    }

    /// Wire up the real REST client and file-backed storage.
    pub fn from_config(config: &StorefrontConfig) -> StorefrontResult<Self> {
        let api = BookstoreApi::new(&config.client)?;
        let storage = FileStorage::open(config.storage_path())?;
        Ok(Self::new(Arc::new(api), Arc::new(storage)))
    }

    /// App start: load the theme and restore the session.
    pub async fn start(&self) -> Theme {
        let theme = self.theme.load().await;
        let state = self.session.restore().await;
        tracing::info!(%theme, logged_in = state.is_logged_in(), "Storefront started");
        theme
    }

    /// Cancel every in-flight view.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    // ---- accessors ----

    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn catalog(&self) -> &crate::catalog::CatalogCache {
        &self.catalog
    }

    pub fn cart(&self) -> &Mutex<Cart> {
        &self.cart
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub async fn query(&self) -> CatalogQuery {
        self.query.read().await.clone()
    }

    pub async fn current_route(&self) -> Route {
        self.route.read().await.clone()
    }

    pub async fn cart_snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.current()
    }

    // ---- navigation ----

    /// Parse `path` and open it. Unknown paths become an error notice and
    /// leave the current page as it was.
    pub async fn navigate(&self, path: &str) -> Option<Page> {
        match Route::parse(path) {
            Ok(route) => self.open(route).await,
            Err(e) => {
                tracing::debug!(%path, error = %e, "Unknown route");
                self.notices.error(e.user_message());
                None
            }
        }
    }

    /// Re-open the current route (after a state change).
    pub async fn reload(&self) -> Option<Page> {
        let route = self.current_route().await;
        self.open(route).await
    }

    /// Open `route` in a fresh view scope, cancelling the previous view.
    ///
    /// Returns `None` when this view was itself superseded before it
    /// finished loading. Redirects are followed.
    pub async fn open(&self, route: Route) -> Option<Page> {
        let mut route = route;
        loop {
            let scope = self.enter_scope().await;
            *self.route.write().await = route.clone();
            tracing::debug!(route = %route, "Opening view");

            let page = self.dispatch(&route, &scope).await;
            if scope.is_cancelled() {
                return None;
            }
            match page {
                Some(Page::Redirect(next)) => {
                    tracing::debug!(from = %route, to = %next, "Redirecting");
                    route = next;
                }
                other => return other,
            }
        }
    }

    async fn dispatch(&self, route: &Route, scope: &ViewScope) -> Option<Page> {
        match route {
            Route::Catalog => views::catalog::load(self, scope).await,
            Route::BookDetail { book_id } => views::book_detail::load(self, scope, *book_id).await,
            Route::Category { name } => {
                views::listing::load(self, scope, ListingKind::Category, name).await
            }
            Route::Author { full_name } => {
                views::listing::load(self, scope, ListingKind::Author, full_name).await
            }
            Route::Publisher { name } => {
                views::listing::load(self, scope, ListingKind::Publisher, name).await
            }
            Route::Orders => views::orders::load(self, scope).await,
            Route::Admin => views::admin::load(self, scope).await,
            Route::AddBook => views::book_form::load(self, scope, None).await,
            Route::EditBook { book_id } => {
                views::book_form::load(self, scope, Some(*book_id)).await
            }
        }
    }

    async fn enter_scope(&self) -> ViewScope {
        let scope = ViewScope::child_of(&self.root);
        if let Some(previous) = self.active_scope.lock().await.replace(scope.clone()) {
            previous.cancel();
        }
        scope
    }

    // ---- listing query ----

    pub async fn set_search(&self, term: &str) {
        self.query.write().await.search = term.trim().to_string();
    }

    /// Set the price range from raw inputs. Both are parsed before either
    /// is applied.
    pub async fn set_price_range(&self, min: &str, max: &str) -> bool {
        let parsed = parse_price_bound("Min price", min)
            .and_then(|min| Ok((min, parse_price_bound("Max price", max)?)));
        match parsed {
            Ok((min, max)) => {
                let mut query = self.query.write().await;
                query.min_price = min;
                query.max_price = max;
                true
            }
            Err(e) => {
                self.notices.error(e.user_message());
                false
            }
        }
    }

    pub async fn set_sort(&self, sort: SortCriterion) {
        self.query.write().await.sort = sort;
    }

    // ---- cart ----

    /// Put a book in the cart. Cached books are used as-is; others are
    /// fetched.
    pub async fn add_to_cart(&self, book_id: DbId) -> bool {
        let book = match self.lookup_book(book_id).await {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(book_id, error = %e, "Cannot add book to cart");
                self.notices.error(e.notice_text(views::book_detail::PRODUCT_NOT_FOUND));
                return false;
            }
        };

        let added = self.cart.lock().await.add(&book);
        if added {
            self.notices.info(format!("'{}' added to cart", book.title));
        } else {
            self.notices.info(format!("'{}' is already in the cart", book.title));
        }
        added
    }

    pub async fn remove_from_cart(&self, book_id: DbId) -> bool {
        self.cart.lock().await.remove(book_id)
    }

    pub async fn set_quantity(&self, book_id: DbId, quantity: i64) -> bool {
        match self.cart.lock().await.update_quantity(book_id, quantity) {
            Ok(true) => true,
            Ok(false) => {
                self.notices.error(format!("Book {book_id} is not in the cart"));
                false
            }
            Err(e) => {
                self.notices.error(e.user_message());
                false
            }
        }
    }

    pub async fn checkout(&self) -> Option<Order> {
        let today = chrono::Local::now().date_naive();
        let result = checkout::place_order(self.backend(), &self.session, &self.cart, today).await;
        self.report(result, Some(ORDER_PLACED), ORDER_FAILED)
    }

    // ---- session ----

    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> Option<User> {
        let form = LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
            remember_me,
        };
        let result = self.session.login(&form).await;
        self.report(result, Some("Success!"), LOGIN_FALLBACK)
    }

    pub async fn register(&self, form: &RegistrationForm) -> Option<User> {
        let result = self.session.register(form).await;
        self.report(result, Some("Registration successful!"), REGISTRATION_FALLBACK)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.notices.info("Logged out");
    }

    pub async fn set_theme(&self, theme: Option<Theme>) -> Theme {
        let result = match theme {
            Some(theme) => self.theme.set(theme).await.map(|()| theme),
            None => self.theme.toggle().await,
        };
        match result {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist theme");
                self.theme.current().await
            }
        }
    }

    // ---- admin ----

    pub async fn admin_user_orders(&self, user_id: DbId) -> Option<Vec<Order>> {
        let result = views::admin::user_orders(self, user_id).await;
        self.report(result, None, "Failed to load orders")
    }

    pub async fn admin_spending(
        &self,
        user_id: DbId,
        start: &str,
        end: &str,
    ) -> Option<SpendingReport> {
        let result = views::admin::spending(self, user_id, start, end).await;
        self.report(result, None, "Failed to calculate spending")
    }

    pub async fn admin_update_user(&self, user_id: DbId, field: &str, value: &str) -> Option<User> {
        let result = views::admin::update_user(self, user_id, field, value).await;
        self.report(result, Some("Users updated successfully!"), "Failed to update user")
    }

    pub async fn admin_delete_user(&self, user_id: DbId) -> bool {
        let result = views::admin::delete_user(self, user_id).await;
        self.report(result, Some("User deleted!"), "Failed to delete user")
            .is_some()
    }

    pub async fn admin_add_user(&self, user: &NewUser) -> Option<User> {
        let result = views::admin::add_user(self, user).await;
        self.report(result, Some("New user added!"), "Failed to add user")
    }

    pub async fn delete_book(&self, book_id: DbId) -> bool {
        let result = views::admin::delete_book(self, book_id).await;
        self.report(result, Some("Book deleted!"), "Failed to delete book")
            .is_some()
    }

    /// Build a book form from `key=value` fields and submit it.
    ///
    /// `cover=<path>` reads the cover image from disk; every other key is
    /// a [`BookForm`] field.
    pub async fn submit_book(
        &self,
        book_id: Option<DbId>,
        fields: &[(String, String)],
    ) -> Option<Book> {
        let (success, failure) = match book_id {
            None => ("Book added successfully!", "Failed to add book"),
            Some(_) => ("Book updated successfully!", "Failed to update book"),
        };

        let result = match build_book_form(fields).await {
            Ok(form) => views::book_form::submit(self, book_id, &form).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(book) => {
                self.notices.success(success);
                Some(book)
            }
            Err(e) => {
                tracing::warn!(?book_id, error = %e, "{failure}");
                let reason = match &e {
                    StorefrontError::Storage(msg) => msg.clone(),
                    other => other.notice_text("Unknown error"),
                };
                self.notices.error(format!("{failure}: {reason}"));
                None
            }
        }
    }

    // ---- private helpers ----

    async fn lookup_book(&self, book_id: DbId) -> StorefrontResult<Book> {
        if let Some(book) = self.catalog.find(book_id).await {
            return Ok(book);
        }
        Ok(self.backend.get_book(book_id).await?)
    }

    /// Publish the outcome of an operation as a notice.
    fn report<T>(
        &self,
        result: StorefrontResult<T>,
        success: Option<&str>,
        fallback: &str,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                if let Some(message) = success {
                    self.notices.success(message);
                }
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "{fallback}");
                self.notices.error(e.notice_text(fallback));
                None
            }
        }
    }
}

async fn build_book_form(fields: &[(String, String)]) -> StorefrontResult<BookForm> {
    let mut form = BookForm::default();
    for (key, value) in fields {
        if key == "cover" {
            form.cover = Some(read_cover(value).await?);
        } else {
            form.set_field(key, value)?;
        }
    }
    Ok(form)
}

async fn read_cover(path: &str) -> StorefrontResult<CoverFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StorefrontError::Storage(format!("Cannot read cover '{path}': {e}")))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    Ok(CoverFile { file_name, bytes })
}
