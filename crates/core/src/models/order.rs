//! Order models and the spending report.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Book, User};
use crate::types::{Date, DbId, DATE_FORMAT};

/// An order as returned by `GET orders/?user_id=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: DbId,
    #[serde(default)]
    pub user: Option<User>,
    pub order_date: Date,
    #[serde(default, deserialize_with = "super::decimal::deserialize_opt")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: DbId,
    #[serde(default)]
    pub book: Option<Book>,
    pub quantity: i32,
}

/// Payload for `POST orders/`. The backend computes the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub user_id: DbId,
    #[serde(serialize_with = "serialize_date")]
    pub order_date: Date,
    pub order_items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
    pub book_id: DbId,
    pub quantity: u32,
}

impl NewOrder {
    /// Mirrors the backend's own checks so a bad order never leaves the
    /// client: at least one item, every quantity positive.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.order_items.is_empty() {
            return Err(CoreError::Validation(
                "Order must include at least 1 item.".to_string(),
            ));
        }
        if let Some(item) = self.order_items.iter().find(|i| i.quantity == 0) {
            return Err(CoreError::Validation(format!(
                "Quantity for book {} must be more than 0.",
                item.book_id
            )));
        }
        Ok(())
    }
}

fn serialize_date<S: serde::Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}

/// Response of `GET calculate-spending/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpendingReport {
    pub user_id: DbId,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub total_spent: f64,
}

/// Inclusive date range for a spending report. Both ends are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendingRange {
    pub start: Date,
    pub end: Date,
}

impl SpendingRange {
    /// Parse the two date inputs of the admin range picker.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        let missing = || CoreError::Validation("Please select both start and end dates.".to_string());
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err(missing());
        }
        let parse = |s: &str| {
            Date::parse_from_str(s, DATE_FORMAT).map_err(|_| {
                CoreError::Validation(format!("'{s}' is not a YYYY-MM-DD date"))
            })
        };
        let range = Self {
            start: parse(start)?,
            end: parse(end)?,
        };
        if range.start > range.end {
            return Err(CoreError::Validation(
                "Start date must not be after end date".to_string(),
            ));
        }
        Ok(range)
    }
}
