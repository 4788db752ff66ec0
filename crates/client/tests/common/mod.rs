use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use bookstore_client::{BookstoreApi, ClientConfig};

/// Session cookie value the fake backend hands out on login.
pub const SESSION_COOKIE: &str = "sessionid=fake-session";

/// Password that makes the fake login endpoint fail with an HTML page.
pub const SERVER_ERROR_PASSWORD: &str = "explode";

/// One write request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

/// Requests captured by the fake backend for later assertions.
#[derive(Default)]
pub struct Recorded {
    pub calls: Vec<Call>,
    pub orders: Vec<Value>,
    pub book_fields: Vec<(String, String)>,
    pub cover_file: Option<(String, usize)>,
    pub spending_query: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct FakeState {
    pub recorded: Arc<Mutex<Recorded>>,
}

/// Start an in-process fake backend on an ephemeral port and return a
/// client pointed at it, plus the shared recording state.
pub async fn spawn_backend() -> (BookstoreApi, FakeState) {
    let state = FakeState::default();
    let app = Router::new()
        .route("/api/books/", get(list_books).post(create_book))
        .route(
            "/api/books/{id}/",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/genres/", get(list_genres))
        .route("/api/authors/", get(list_authors))
        .route("/api/publishers/", get(list_publishers))
        .route("/api/users/", get(list_users).post(create_user))
        .route("/api/users/{id}/", put(update_user).delete(delete_user))
        .route("/api/users/login/", post(login))
        .route("/api/users/logout/", post(logout))
        .route("/api/users/check-auth/", get(check_auth))
        .route("/api/orders/", get(list_orders).post(create_order))
        .route("/api/calculate-spending/", get(calculate_spending))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });

    let config = ClientConfig::new(format!("http://{addr}/api"), None);
    let api = BookstoreApi::new(&config).expect("client builds");
    (api, state)
}

pub fn book_json(id: i64, title: &str, price: &str) -> Value {
    json!({
        "book_id": id,
        "title": title,
        "price": price,
        "cover": null,
        "cover_url": null,
        "publication_date": "2001-09-01",
        "author": {"author_id": 1, "first_name": "Ivan", "last_name": "Franko", "birthdate": null},
        "genre": {"genre_id": 2, "genre_name": "Drama"},
        "publisher": {"publisher_id": 3, "publisher_name": "Folio", "address": null, "phone": null, "email": null}
    })
}

impl FakeState {
    fn record(&self, method: &Method, uri: &Uri, body: Value) {
        self.recorded.lock().unwrap().calls.push(Call {
            method: method.clone(),
            path: uri.path().to_string(),
            body,
        });
    }

    /// The only write request received so far.
    pub fn single_call(&self) -> Call {
        let recorded = self.recorded.lock().unwrap();
        assert_eq!(recorded.calls.len(), 1, "calls: {:?}", recorded.calls);
        recorded.calls[0].clone()
    }
}

fn user_json() -> Value {
    json!({
        "user_id": 7,
        "first_name": "Lesya",
        "last_name": "Ukrainka",
        "email": "lesya@example.com",
        "is_admin": false
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_books() -> Json<Value> {
    Json(json!([book_json(1, "Zakhar Berkut", "300.00"), book_json(2, "Moses", "120.50")]))
}

async fn get_book(Path(id): Path<i64>) -> Response {
    if id == 1 {
        Json(book_json(1, "Zakhar Berkut", "300.00")).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
    }
}

/// Text fields and the optional cover `(file name, size)` of a book form.
async fn read_book_form(mut multipart: Multipart) -> (Vec<(String, String)>, Option<(String, usize)>) {
    let mut fields = Vec::new();
    let mut cover = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "cover" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            cover = Some((file_name, bytes.len()));
        } else {
            let text = field.text().await.unwrap_or_default();
            fields.push((name, text));
        }
    }
    (fields, cover)
}

fn fields_json(fields: &[(String, String)]) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

async fn create_book(State(state): State<FakeState>, multipart: Multipart) -> Response {
    let (fields, cover) = read_book_form(multipart).await;
    let has_author = fields
        .iter()
        .any(|(k, _)| k == "author_id" || k.starts_with("author."));
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.book_fields = fields;
        recorded.cover_file = cover;
    }

    if !has_author {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": ["Provide exactly one of 'author_id' or 'author' data."]})),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(book_json(10, "New Book", "99.00"))).into_response()
}

async fn update_book(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let (fields, cover) = read_book_form(multipart).await;
    state.record(&method, &uri, fields_json(&fields));
    let field = |key: &str| {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let title = field("title").unwrap_or_else(|| "Zakhar Berkut".to_string());
    let price = field("price").unwrap_or_else(|| "300.00".to_string());
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.book_fields = fields;
        recorded.cover_file = cover;
    }
    Json(book_json(id, &title, &price)).into_response()
}

async fn delete_book(State(state): State<FakeState>, method: Method, uri: Uri) -> StatusCode {
    state.record(&method, &uri, Value::Null);
    StatusCode::NO_CONTENT
}

async fn list_genres() -> Json<Value> {
    Json(json!([
        {"genre_id": 1, "genre_name": "Poetry"},
        {"genre_id": 2, "genre_name": "Drama"}
    ]))
}

async fn list_authors() -> Json<Value> {
    Json(json!([
        {"author_id": 1, "first_name": "Ivan", "last_name": "Franko", "birthdate": "1856-08-27"},
        {"author_id": 2, "first_name": "Lesya", "last_name": "Ukrainka", "birthdate": null}
    ]))
}

async fn list_publishers() -> Json<Value> {
    Json(json!([
        {"publisher_id": 3, "publisher_name": "Folio", "address": "Kharkiv", "phone": null, "email": "info@folio.ua"}
    ]))
}

async fn list_users() -> Json<Value> {
    Json(json!([
        user_json(),
        {"user_id": 1, "first_name": "Admin", "last_name": "Root", "email": "admin@example.com", "is_admin": true}
    ]))
}

async fn create_user(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    state.record(&method, &uri, body.clone());
    if body["email"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["This field may not be blank."]})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "user_id": 8,
            "first_name": body["first_name"],
            "last_name": body["last_name"],
            "email": body["email"],
            "phone": body["phone"],
            "address": body["address"],
            "is_admin": false
        })),
    )
        .into_response()
}

async fn update_user(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&method, &uri, body.clone());
    Json(json!({
        "user_id": id,
        "first_name": body["first_name"],
        "last_name": body["last_name"],
        "email": body["email"],
        "phone": body["phone"],
        "address": body["address"],
        "is_admin": false
    }))
}

async fn delete_user(State(state): State<FakeState>, method: Method, uri: Uri) -> StatusCode {
    state.record(&method, &uri, Value::Null);
    StatusCode::NO_CONTENT
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == SERVER_ERROR_PASSWORD {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<!DOCTYPE html><html><body><h1>Server Error (500)</h1></body></html>"),
        )
            .into_response();
    }
    if body["password"] == "secret" {
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, format!("{SESSION_COOKIE}; Path=/").parse().unwrap());
        (
            StatusCode::OK,
            headers,
            Json(json!({"message": "Login successful", "user": user_json()})),
        )
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Wrong password"}))).into_response()
    }
}

async fn logout(State(state): State<FakeState>, method: Method, uri: Uri) -> Json<Value> {
    state.record(&method, &uri, Value::Null);
    Json(json!({"message": "Successful logout"}))
}

async fn check_auth(headers: HeaderMap) -> Response {
    let has_session = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SESSION_COOKIE));
    if has_session {
        Json(json!({"user": user_json()})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Didn't authorize"}))).into_response()
    }
}

async fn list_orders(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("user_id").map(String::as_str) == Some("7") {
        Json(json!([{
            "order_id": 1,
            "order_date": "2024-05-01",
            "total_amount": "130.00",
            "order_items": [
                {"order_item_id": 1, "book": book_json(1, "Zakhar Berkut", "50.00"), "quantity": 2}
            ]
        }]))
    } else {
        Json(json!([]))
    }
}

async fn create_order(State(state): State<FakeState>, Json(body): Json<Value>) -> Response {
    state.recorded.lock().unwrap().orders.push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({
            "order_id": 2,
            "order_date": body["order_date"],
            "total_amount": "80.00",
            "order_items": []
        })),
    )
        .into_response()
}

async fn calculate_spending(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.recorded.lock().unwrap().spending_query = params.clone();
    let user_id: i64 = params
        .get("user_id")
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    Json(json!({"user_id": user_id, "total_spent": 410.5}))
}
