//! Book catalog models and the add/edit book form.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Date, DbId, DATE_FORMAT};

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// A book as returned by `GET books/`.
///
/// Nested references are optional on the wire; display helpers fall back
/// to empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: DbId,
    pub title: String,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub price: f64,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub publication_date: Option<Date>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub publisher: Option<Publisher>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub author_id: DbId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birthdate: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: DbId,
    pub genre_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub publisher_id: DbId,
    pub publisher_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Author {
    /// `"first last"`, the form used in author links and search.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Book {
    /// Author display name, `" "` when the author is missing (matching the
    /// listing's `"first last"` concatenation of empty parts).
    pub fn author_name(&self) -> String {
        match &self.author {
            Some(author) => author.full_name(),
            None => " ".to_string(),
        }
    }

    pub fn genre_name(&self) -> &str {
        self.genre.as_ref().map_or("", |g| g.genre_name.as_str())
    }

    pub fn publisher_name(&self) -> &str {
        self.publisher
            .as_ref()
            .map_or("", |p| p.publisher_name.as_str())
    }

    /// Best available cover reference: absolute URL first, raw path second.
    pub fn cover_ref(&self) -> Option<&str> {
        self.cover_url.as_deref().or(self.cover.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Add / edit form
// ---------------------------------------------------------------------------

/// How a form sets one of the book's relations.
///
/// The backend requires exactly one of "existing id" or "nested new
/// record" on create; on edit the relation may be left alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RelationChoice<T> {
    #[default]
    Unset,
    Existing(DbId),
    New(T),
}

impl<T: Default> RelationChoice<T> {
    /// Switch to [`RelationChoice::New`], keeping a draft already in
    /// progress, and apply `edit` to it.
    pub fn edit_new(&mut self, edit: impl FnOnce(&mut T)) {
        let mut draft = match std::mem::take(self) {
            RelationChoice::New(draft) => draft,
            _ => T::default(),
        };
        edit(&mut draft);
        *self = RelationChoice::New(draft);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenreDraft {
    pub genre_name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
    pub birthdate: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublisherDraft {
    pub publisher_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Cover image read from disk, sent as the `cover` multipart file part.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Whether a [`BookForm`] creates a book or partially updates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Values collected by the add/edit book page.
///
/// Price is kept as the raw text the user typed and parsed during
/// [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookForm {
    pub title: String,
    pub price: String,
    pub publication_date: Option<Date>,
    pub genre: RelationChoice<GenreDraft>,
    pub author: RelationChoice<AuthorDraft>,
    pub publisher: RelationChoice<PublisherDraft>,
    pub cover: Option<CoverFile>,
}

/// Field names accepted by [`BookForm::set_field`].
pub const BOOK_FORM_FIELDS: &[&str] = &[
    "title",
    "price",
    "date",
    "genre_id",
    "genre",
    "author_id",
    "author_first",
    "author_last",
    "author_birthdate",
    "publisher_id",
    "publisher",
    "publisher_address",
    "publisher_phone",
    "publisher_email",
];

impl BookForm {
    /// Pre-fill an edit form from an existing book, selecting its current
    /// relations by id.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            price: book.price.to_string(),
            publication_date: book.publication_date,
            genre: book
                .genre
                .as_ref()
                .map_or(RelationChoice::Unset, |g| RelationChoice::Existing(g.genre_id)),
            author: book
                .author
                .as_ref()
                .map_or(RelationChoice::Unset, |a| RelationChoice::Existing(a.author_id)),
            publisher: book.publisher.as_ref().map_or(RelationChoice::Unset, |p| {
                RelationChoice::Existing(p.publisher_id)
            }),
            cover: None,
        }
    }

    /// Set one field from a `key=value` style input.
    ///
    /// Setting any "new record" field switches that relation to
    /// [`RelationChoice::New`]; setting the `_id` field switches it to
    /// [`RelationChoice::Existing`].
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let value = value.trim();
        match key {
            "title" => self.title = value.to_string(),
            "price" => self.price = value.to_string(),
            "date" => self.publication_date = parse_optional_date(key, value)?,
            "genre_id" => self.genre = RelationChoice::Existing(parse_id(key, value)?),
            "genre" => {
                self.genre = RelationChoice::New(GenreDraft {
                    genre_name: value.to_string(),
                })
            }
            "author_id" => self.author = RelationChoice::Existing(parse_id(key, value)?),
            "author_first" => self.author.edit_new(|a| a.first_name = value.to_string()),
            "author_last" => self.author.edit_new(|a| a.last_name = value.to_string()),
            "author_birthdate" => {
                let birthdate = parse_optional_date(key, value)?;
                self.author.edit_new(|a| a.birthdate = birthdate)
            }
            "publisher_id" => self.publisher = RelationChoice::Existing(parse_id(key, value)?),
            "publisher" => self.publisher.edit_new(|p| p.publisher_name = value.to_string()),
            "publisher_address" => self.publisher.edit_new(|p| p.address = non_empty(value)),
            "publisher_phone" => self.publisher.edit_new(|p| p.phone = non_empty(value)),
            "publisher_email" => self.publisher.edit_new(|p| p.email = non_empty(value)),
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown book field '{other}'. Must be one of: {}",
                    BOOK_FORM_FIELDS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Validate the form before it is sent.
    ///
    /// Rules:
    /// - Create: title and price are required; each relation must be
    ///   chosen (existing id or a new record).
    /// - Edit: blank title/price mean "unchanged"; relations may be unset.
    /// - Price, when present, must be a non-negative number.
    /// - A new author needs first and last name; a new genre or publisher
    ///   needs a name.
    pub fn validate(&self, mode: FormMode) -> Result<(), CoreError> {
        if mode == FormMode::Create {
            if self.title.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Please enter the book title".to_string(),
                ));
            }
            if self.price.trim().is_empty() {
                return Err(CoreError::Validation("Please enter the price".to_string()));
            }
            if self.genre == RelationChoice::Unset {
                return Err(CoreError::Validation("Please select a genre".to_string()));
            }
            if self.author == RelationChoice::Unset {
                return Err(CoreError::Validation(
                    "Please select an author".to_string(),
                ));
            }
            if self.publisher == RelationChoice::Unset {
                return Err(CoreError::Validation(
                    "Please select a publisher".to_string(),
                ));
            }
        }

        self.parsed_price()?;

        if let RelationChoice::New(genre) = &self.genre {
            if genre.genre_name.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Please enter genre name".to_string(),
                ));
            }
        }
        if let RelationChoice::New(author) = &self.author {
            if author.first_name.trim().is_empty() || author.last_name.trim().is_empty() {
                return Err(CoreError::Validation(
                    "A new author needs both first and last name".to_string(),
                ));
            }
        }
        if let RelationChoice::New(publisher) = &self.publisher {
            if publisher.publisher_name.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Please enter publisher name".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Parsed price, `None` when left blank.
    pub fn parsed_price(&self) -> Result<Option<f64>, CoreError> {
        let raw = self.price.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => Ok(Some(p)),
            _ => Err(CoreError::Validation(format!(
                "Price must be a non-negative number, got '{raw}'"
            ))),
        }
    }

    /// Flat text fields in the backend's multipart key convention
    /// (`genre_id` or `genre.genre_name`, `author.first_name`, ...).
    ///
    /// The cover file part is added separately by the HTTP layer.
    pub fn multipart_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        let mut push = |k: &str, v: String| fields.push((k.to_string(), v));

        if !self.title.trim().is_empty() {
            push("title", self.title.trim().to_string());
        }
        if !self.price.trim().is_empty() {
            push("price", self.price.trim().to_string());
        }
        if let Some(date) = self.publication_date {
            push("publication_date", date.format(DATE_FORMAT).to_string());
        }

        match &self.genre {
            RelationChoice::Existing(id) => push("genre_id", id.to_string()),
            RelationChoice::New(g) => push("genre.genre_name", g.genre_name.clone()),
            RelationChoice::Unset => {}
        }

        match &self.author {
            RelationChoice::Existing(id) => push("author_id", id.to_string()),
            RelationChoice::New(a) => {
                push("author.first_name", a.first_name.clone());
                push("author.last_name", a.last_name.clone());
                if let Some(b) = a.birthdate {
                    push("author.birthdate", b.format(DATE_FORMAT).to_string());
                }
            }
            RelationChoice::Unset => {}
        }

        match &self.publisher {
            RelationChoice::Existing(id) => push("publisher_id", id.to_string()),
            RelationChoice::New(p) => {
                push("publisher.publisher_name", p.publisher_name.clone());
                if let Some(v) = &p.address {
                    push("publisher.address", v.clone());
                }
                if let Some(v) = &p.phone {
                    push("publisher.phone", v.clone());
                }
                if let Some(v) = &p.email {
                    push("publisher.email", v.clone());
                }
            }
            RelationChoice::Unset => {}
        }

        fields
    }
}

fn parse_id(field: &str, value: &str) -> Result<DbId, CoreError> {
    value
        .parse::<DbId>()
        .map_err(|_| CoreError::Validation(format!("{field} must be a numeric id, got '{value}'")))
}

fn parse_optional_date(field: &str, value: &str) -> Result<Option<Date>, CoreError> {
    if value.is_empty() {
        return Ok(None);
    }
    Date::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| CoreError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
