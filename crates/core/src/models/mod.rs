//! Wire models for the bookstore backend.
//!
//! These mirror the JSON the REST backend produces and accepts. The
//! storefront never owns the records of truth; it only reads them, and
//! submits new or changed values through the form payloads.

pub mod book;
pub mod order;
pub mod user;

pub use book::{
    Author, AuthorDraft, Book, BookForm, CoverFile, FormMode, Genre, GenreDraft, Publisher,
    PublisherDraft, RelationChoice,
};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, SpendingRange, SpendingReport};
pub use user::{AuthResponse, LoginForm, NewUser, RegistrationForm, User, UserUpdate};

/// Serde helpers for backend decimal fields.
///
/// The backend serializes `DecimalField` values as JSON strings
/// (`"123.45"`), but numbers are accepted as well.
pub mod decimal {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn parse<E: de::Error>(raw: Raw) -> Result<f64, E> {
        match raw {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid decimal value \"{s}\""))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        parse(Raw::deserialize(deserializer)?)
    }

    /// Nullable variant; use with `#[serde(default, deserialize_with = ...)]`.
    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            Some(raw) => parse(raw).map(Some),
            None => Ok(None),
        }
    }
}
