//! Storefront route table.
//!
//! Every client-facing path maps to exactly one [`Route`] variant; the
//! storefront dispatches on the variant with an exhaustive `match`.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Catalog,
    /// `/add`
    AddBook,
    /// `/edit/:book_id`
    EditBook { book_id: DbId },
    /// `/book/:id`
    BookDetail { book_id: DbId },
    /// `/category/:category`
    Category { name: String },
    /// `/author/:author` (author's `"first last"` name)
    Author { full_name: String },
    /// `/publisher/:publisher`
    Publisher { name: String },
    /// `/orders`
    Orders,
    /// `/admin`
    Admin,
}

impl Route {
    /// Parse a path such as `/author/Ivan%20Franko`.
    ///
    /// Trailing slashes are ignored and path parameters are
    /// percent-decoded.
    pub fn parse(path: &str) -> Result<Self, CoreError> {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Route::Catalog,
            ["add"] => Route::AddBook,
            ["orders"] => Route::Orders,
            ["admin"] => Route::Admin,
            ["edit", id] => Route::EditBook {
                book_id: parse_book_id(id)?,
            },
            ["book", id] => Route::BookDetail {
                book_id: parse_book_id(id)?,
            },
            ["category", name] => Route::Category {
                name: decode(name)?,
            },
            ["author", name] => Route::Author {
                full_name: decode(name)?,
            },
            ["publisher", name] => Route::Publisher {
                name: decode(name)?,
            },
            _ => {
                return Err(CoreError::Validation(format!(
                    "No page matches '{trimmed}'"
                )))
            }
        };
        Ok(route)
    }

    /// Render back to a link path, percent-encoding parameters.
    pub fn path(&self) -> String {
        match self {
            Route::Catalog => "/".to_string(),
            Route::AddBook => "/add".to_string(),
            Route::EditBook { book_id } => format!("/edit/{book_id}"),
            Route::BookDetail { book_id } => format!("/book/{book_id}"),
            Route::Category { name } => format!("/category/{}", urlencoding::encode(name)),
            Route::Author { full_name } => {
                format!("/author/{}", urlencoding::encode(full_name))
            }
            Route::Publisher { name } => format!("/publisher/{}", urlencoding::encode(name)),
            Route::Orders => "/orders".to_string(),
            Route::Admin => "/admin".to_string(),
        }
    }

    /// Pages that render "Access denied" for non-admins.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, Route::AddBook | Route::EditBook { .. } | Route::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

fn parse_book_id(raw: &str) -> Result<DbId, CoreError> {
    raw.parse::<DbId>()
        .map_err(|_| CoreError::Validation(format!("'{raw}' is not a book id")))
}

fn decode(raw: &str) -> Result<String, CoreError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| CoreError::Validation(format!("Malformed path segment '{raw}': {e}")))
}
