//! Client-side catalog derivation: text/price filtering, sorting and the
//! exact-match selectors used by the genre, author and publisher pages.
//!
//! Everything here works on an already-fetched slice of [`Book`]s and
//! returns borrowed views; the source order is never mutated.

use std::cmp::Ordering;
use std::str::FromStr;

use feruca::Collator;

use crate::error::CoreError;
use crate::models::Book;

// ---------------------------------------------------------------------------
// Sort criterion
// ---------------------------------------------------------------------------

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriterion {
    /// Keep fetch order.
    #[default]
    None,
    /// Locale-aware ascending by title.
    Title,
    /// Numeric ascending by price.
    Price,
}

impl FromStr for SortCriterion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "title" | "name" => Ok(Self::Title),
            "price" => Ok(Self::Price),
            other => Err(CoreError::Validation(format!(
                "Unknown sort criterion '{other}'. Must be one of: none, title, price"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// The listing's search box, price range inputs and sort selector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogQuery {
    pub search: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: SortCriterion,
}

impl CatalogQuery {
    /// Build a query from raw text inputs.
    ///
    /// Blank price inputs mean "unset"; anything else must parse as a
    /// number.
    pub fn from_inputs(search: &str, min_price: &str, max_price: &str) -> Result<Self, CoreError> {
        Ok(Self {
            search: search.to_string(),
            min_price: parse_price_bound("Min price", min_price)?,
            max_price: parse_price_bound("Max price", max_price)?,
            sort: SortCriterion::None,
        })
    }

    pub fn with_sort(mut self, sort: SortCriterion) -> Self {
        self.sort = sort;
        self
    }

    /// Does `book` pass the text and price filters?
    ///
    /// Text matches when the title, the `"first last"` author name, or the
    /// genre name contains the search term, case-insensitively. An empty
    /// term matches everything.
    pub fn matches(&self, book: &Book) -> bool {
        let term = self.search.to_lowercase();
        let matches_text = term.is_empty()
            || book.title.to_lowercase().contains(&term)
            || book.author_name().to_lowercase().contains(&term)
            || book.genre_name().to_lowercase().contains(&term);

        let matches_min = self.min_price.map_or(true, |min| book.price >= min);
        let matches_max = self.max_price.map_or(true, |max| book.price <= max);

        matches_text && matches_min && matches_max
    }

    /// Filter, then sort.
    pub fn apply<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        let mut view = filter(books, self);
        sort(&mut view, self.sort);
        view
    }
}

/// Parse one price range input. Blank -> `None`.
pub fn parse_price_bound(label: &str, raw: &str) -> Result<Option<f64>, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(CoreError::Validation(format!(
            "{label} must be a number, got '{raw}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Books passing `query`'s filters, in source order.
pub fn filter<'a>(books: &'a [Book], query: &CatalogQuery) -> Vec<&'a Book> {
    books.iter().filter(|b| query.matches(b)).collect()
}

/// Stable in-place sort of a view. `SortCriterion::None` leaves it alone.
pub fn sort(view: &mut [&Book], criterion: SortCriterion) {
    match criterion {
        SortCriterion::None => {}
        SortCriterion::Title => {
            let mut collator = Collator::default();
            view.sort_by(|a, b| collate(&mut collator, &a.title, &b.title));
        }
        SortCriterion::Price => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
    }
}

/// Locale-aware string ordering.
///
/// Unicode collation (CLDR root order), so case and accents are secondary
/// to the base letter and Cyrillic letters such as `ї` sort inside their
/// alphabet. Raw strings break ties so the order is total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collate(&mut Collator::default(), a, b)
}

fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Books whose genre name equals `name`, case-insensitively.
pub fn by_genre<'a>(books: &'a [Book], name: &str) -> Vec<&'a Book> {
    let name = name.to_lowercase();
    books
        .iter()
        .filter(|b| b.genre.is_some() && b.genre_name().to_lowercase() == name)
        .collect()
}

/// Books whose `"first last"` author name equals `full_name`,
/// case-insensitively.
pub fn by_author<'a>(books: &'a [Book], full_name: &str) -> Vec<&'a Book> {
    let full_name = full_name.to_lowercase();
    books
        .iter()
        .filter(|b| b.author_name().to_lowercase() == full_name)
        .collect()
}

/// Books whose publisher name equals `name`, case-insensitively.
pub fn by_publisher<'a>(books: &'a [Book], name: &str) -> Vec<&'a Book> {
    let name = name.to_lowercase();
    books
        .iter()
        .filter(|b| b.publisher.is_some() && b.publisher_name().to_lowercase() == name)
        .collect()
}
