//! Genre, author and publisher pages.
//!
//! All three select from the cached catalog by exact, case-insensitive
//! name; author and publisher pages also show details taken from the
//! first matching book.

use bookstore_core::catalog;
use bookstore_core::models::Book;
use bookstore_core::types::DATE_FORMAT;

use crate::app::Storefront;
use crate::scope::ViewScope;
use crate::views::Page;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Category,
    Author,
    Publisher,
}

impl ListingKind {
    pub fn heading(self) -> &'static str {
        match self {
            ListingKind::Category => "Genre",
            ListingKind::Author => "Author",
            ListingKind::Publisher => "Publisher",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ListingKind::Category => "No products found in this genre.",
            ListingKind::Author => "No products found by this author.",
            ListingKind::Publisher => "No products found from this publisher.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub kind: ListingKind,
    pub name: String,
    /// Label/value pairs shown under the heading.
    pub details: Vec<(&'static str, String)>,
    pub books: Vec<Book>,
}

pub async fn load(
    app: &Storefront,
    scope: &ViewScope,
    kind: ListingKind,
    name: &str,
) -> Option<Page> {
    let books = match scope.run(app.catalog().books()).await? {
        Ok(books) => books,
        Err(e) => {
            tracing::warn!(kind = kind.heading(), %name, error = %e, "Failed to load books");
            app.notices().error("Failed to load books");
            app.catalog().cached().await.unwrap_or_default()
        }
    };

    let matches: Vec<Book> = match kind {
        ListingKind::Category => catalog::by_genre(&books, name),
        ListingKind::Author => catalog::by_author(&books, name),
        ListingKind::Publisher => catalog::by_publisher(&books, name),
    }
    .into_iter()
    .cloned()
    .collect();

    Some(Page::Listing(ListingPage {
        kind,
        name: name.to_string(),
        details: details(kind, matches.first()),
        books: matches,
    }))
}

fn details(kind: ListingKind, first: Option<&Book>) -> Vec<(&'static str, String)> {
    let or_unknown = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| UNKNOWN.to_string());
    match kind {
        ListingKind::Category => Vec::new(),
        ListingKind::Author => {
            let birthdate = first
                .and_then(|b| b.author.as_ref())
                .and_then(|a| a.birthdate)
                .map(|d| d.format(DATE_FORMAT).to_string());
            vec![("Born in", or_unknown(birthdate))]
        }
        ListingKind::Publisher => {
            let publisher = first.and_then(|b| b.publisher.as_ref());
            vec![
                ("Address", or_unknown(publisher.and_then(|p| p.address.clone()))),
                ("Phone", or_unknown(publisher.and_then(|p| p.phone.clone()))),
                ("Email", or_unknown(publisher.and_then(|p| p.email.clone()))),
            ]
        }
    }
}
