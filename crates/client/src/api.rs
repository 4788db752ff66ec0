//! REST API client for the bookstore backend.
//!
//! Wraps every endpoint the storefront consumes using [`reqwest`]. The
//! backend identifies the logged-in user by a session cookie, so the
//! underlying client keeps a cookie store.

use bookstore_core::models::{
    AuthResponse, Author, Book, BookForm, Genre, LoginForm, NewOrder, NewUser, Order, Publisher,
    SpendingRange, SpendingReport, User, UserUpdate,
};
use bookstore_core::types::{DbId, DATE_FORMAT};
use reqwest::multipart;
use reqwest::StatusCode;

use crate::config::ClientConfig;

/// HTTP client for one bookstore backend.
#[derive(Debug, Clone)]
pub struct BookstoreApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Bookstore API error ({status}): {}", describe(.message))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from a recognized JSON error body; empty otherwise.
        message: String,
    },
}

impl ApiError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// The backend's own message for status errors, `None` for transport
    /// failures.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

impl BookstoreApi {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.clone(),
        })
    }

    /// Reuse an existing [`reqwest::Client`]. `api_url` must end in `/`.
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- books ----

    /// `GET books/`
    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let response = self.client.get(self.url("books/")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET books/{id}/`
    pub async fn get_book(&self, book_id: DbId) -> Result<Book, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("books/{book_id}/")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST books/` as multipart form data.
    pub async fn create_book(&self, form: &BookForm) -> Result<Book, ApiError> {
        let response = self
            .client
            .post(self.url("books/"))
            .multipart(Self::book_multipart(form)?)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT books/{id}/` as multipart form data. The backend treats it
    /// as a partial update.
    pub async fn update_book(&self, book_id: DbId, form: &BookForm) -> Result<Book, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("books/{book_id}/")))
            .multipart(Self::book_multipart(form)?)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE books/{id}/`
    pub async fn delete_book(&self, book_id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("books/{book_id}/")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- reference data ----

    /// `GET genres/`
    pub async fn list_genres(&self) -> Result<Vec<Genre>, ApiError> {
        let response = self.client.get(self.url("genres/")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET authors/`
    pub async fn list_authors(&self) -> Result<Vec<Author>, ApiError> {
        let response = self.client.get(self.url("authors/")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET publishers/`
    pub async fn list_publishers(&self) -> Result<Vec<Publisher>, ApiError> {
        let response = self.client.get(self.url("publishers/")).send().await?;
        Self::parse_response(response).await
    }

    // ---- users ----

    /// `GET users/`
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.client.get(self.url("users/")).send().await?;
        Self::parse_response(response).await
    }

    /// `POST users/`
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let response = self
            .client
            .post(self.url("users/"))
            .json(user)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT users/{id}/`
    pub async fn update_user(&self, user_id: DbId, update: &UserUpdate) -> Result<User, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("users/{user_id}/")))
            .json(update)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE users/{id}/`
    pub async fn delete_user(&self, user_id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("users/{user_id}/")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- authentication ----

    /// `POST users/login/`. On success the backend sets its session cookie.
    pub async fn login(&self, form: &LoginForm) -> Result<User, ApiError> {
        let response = self
            .client
            .post(self.url("users/login/"))
            .json(form)
            .send()
            .await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        Ok(auth.user)
    }

    /// `POST users/logout/`
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.client.post(self.url("users/logout/")).send().await?;
        Self::check_status(response).await
    }

    /// `GET users/check-auth/`: the user bound to the current session.
    pub async fn check_auth(&self) -> Result<User, ApiError> {
        let response = self.client.get(self.url("users/check-auth/")).send().await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        Ok(auth.user)
    }

    // ---- orders ----

    /// `GET orders/?user_id=`
    pub async fn list_orders(&self, user_id: DbId) -> Result<Vec<Order>, ApiError> {
        let response = self
            .client
            .get(self.url("orders/"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST orders/`. The backend computes `total_amount`.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let response = self
            .client
            .post(self.url("orders/"))
            .json(order)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET calculate-spending/?user_id=&start_date=&end_date=`
    pub async fn calculate_spending(
        &self,
        user_id: DbId,
        range: SpendingRange,
    ) -> Result<SpendingReport, ApiError> {
        let response = self
            .client
            .get(self.url("calculate-spending/"))
            .query(&[
                ("user_id", user_id.to_string()),
                ("start_date", range.start.format(DATE_FORMAT).to_string()),
                ("end_date", range.end.format(DATE_FORMAT).to_string()),
            ])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Encode a book form as multipart with the backend's flat nested keys.
    fn book_multipart(form: &BookForm) -> Result<multipart::Form, ApiError> {
        let mut body = multipart::Form::new();
        for (key, value) in form.multipart_fields() {
            body = body.text(key, value);
        }
        if let Some(cover) = &form.cover {
            let part = multipart::Part::bytes(cover.bytes.clone())
                .file_name(cover.file_name.clone())
                .mime_str(guess_image_mime(&cover.file_name))?;
            body = body.part("cover", part);
        }
        Ok(body)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`] with the
    /// backend's message on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = extract_message(&body);
            tracing::debug!(status = status.as_u16(), %body, "Backend returned an error");
            return Err(ApiError::status(status, message.unwrap_or_default()));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// Recognized shapes, in order: `{"error": "..."}`, `{"detail": "..."}`,
/// `{"non_field_errors": ["..."]}`, a bare JSON list of strings, and
/// per-field errors `{"field": ["..."]}` (reported as `field: ...`).
/// Anything else (HTML error pages, plain text) yields `None`.
pub fn extract_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;

    let first_string = |v: &serde_json::Value| -> Option<String> {
        match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                items.iter().find_map(|i| i.as_str().map(str::to_string))
            }
            _ => None,
        }
    };

    match &json {
        serde_json::Value::Object(map) => ["error", "detail", "non_field_errors"]
            .iter()
            .find_map(|key| map.get(*key).and_then(first_string))
            .or_else(|| {
                map.iter()
                    .find_map(|(field, v)| first_string(v).map(|msg| format!("{field}: {msg}")))
            }),
        serde_json::Value::Array(_) => first_string(&json),
        _ => None,
    }
}

fn describe(message: &str) -> &str {
    if message.is_empty() {
        "no message"
    } else {
        message
    }
}

fn guess_image_mime(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}
