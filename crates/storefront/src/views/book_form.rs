//! Add-book and edit-book pages.

use bookstore_core::models::{Author, Book, BookForm, FormMode, Genre, Publisher};
use bookstore_core::session::ACCESS_DENIED;
use bookstore_core::types::DbId;

use crate::app::Storefront;
use crate::error::StorefrontResult;
use crate::scope::ViewScope;
use crate::views::book_detail::PRODUCT_NOT_FOUND;
use crate::views::Page;

#[derive(Debug, Clone, PartialEq)]
pub struct BookFormPage {
    pub mode: FormMode,
    /// Set when editing.
    pub book_id: Option<DbId>,
    /// Pre-filled values (empty when adding).
    pub form: BookForm,
    pub genres: Vec<Genre>,
    pub authors: Vec<Author>,
    pub publishers: Vec<Publisher>,
}

/// `/add` and `/edit/:id`. Admin only.
///
/// The three option lists load concurrently; each failure is reported
/// on its own and leaves that list empty.
pub async fn load(app: &Storefront, scope: &ViewScope, book_id: Option<DbId>) -> Option<Page> {
    if app.session().require_admin().is_err() {
        return Some(Page::Message(ACCESS_DENIED.to_string()));
    }

    let backend = app.backend();
    let (genres, authors, publishers) = scope
        .run(async {
            tokio::join!(
                backend.list_genres(),
                backend.list_authors(),
                backend.list_publishers()
            )
        })
        .await?;

    let genres = options(app, genres, "genres");
    let authors = options(app, authors, "authors");
    let publishers = options(app, publishers, "publishers");

    let (mode, form) = match book_id {
        None => (FormMode::Create, BookForm::default()),
        Some(id) => match existing_book(app, scope, id).await? {
            Some(book) => (FormMode::Edit, BookForm::from_book(&book)),
            None => return Some(Page::Message(PRODUCT_NOT_FOUND.to_string())),
        },
    };

    Some(Page::BookForm(BookFormPage {
        mode,
        book_id,
        form,
        genres,
        authors,
        publishers,
    }))
}

/// Validate and send the form. `book_id` selects create (`None`) or
/// partial update. The cached catalog is dropped on success.
pub async fn submit(
    app: &Storefront,
    book_id: Option<DbId>,
    form: &BookForm,
) -> StorefrontResult<Book> {
    app.session().require_admin()?;
    let mode = match book_id {
        None => FormMode::Create,
        Some(_) => FormMode::Edit,
    };
    form.validate(mode)?;

    let book = match book_id {
        None => app.backend().create_book(form).await?,
        Some(id) => app.backend().update_book(id, form).await?,
    };
    tracing::info!(book_id = book.book_id, ?mode, "Book saved");
    app.catalog().invalidate().await;
    Ok(book)
}

// ---- private helpers ----

fn options<T>(
    app: &Storefront,
    result: Result<Vec<T>, bookstore_client::ApiError>,
    what: &str,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load {what}");
        app.notices().error(format!("Failed to load {what}"));
        Vec::new()
    })
}

/// `Some(None)` means the book does not exist; `None` means cancelled.
async fn existing_book(app: &Storefront, scope: &ViewScope, book_id: DbId) -> Option<Option<Book>> {
    if let Some(book) = app.catalog().find(book_id).await {
        return Some(Some(book));
    }
    match scope.run(app.backend().get_book(book_id)).await? {
        Ok(book) => Some(Some(book)),
        Err(e) => {
            tracing::warn!(book_id, error = %e, "Failed to load book for editing");
            Some(None)
        }
    }
}
