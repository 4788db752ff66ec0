//! Shopping cart reducer.
//!
//! Pure in-memory state: an ordered list of [`CartLine`]s, one per book,
//! in the order they were added. No I/O happens here; checkout lives in
//! the storefront crate.

use serde::Serialize;

use crate::error::CoreError;
use crate::models::{Book, NewOrderItem};
use crate::types::DbId;

/// Smallest quantity a line may hold.
pub const MIN_QUANTITY: u32 = 1;

/// One book + quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub book_id: DbId,
    pub name: String,
    pub author: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn from_book(book: &Book) -> Self {
        Self {
            book_id: book.book_id,
            name: book.title.clone(),
            author: book.author_name(),
            unit_price: book.price,
            quantity: MIN_QUANTITY,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// The cart. At most one line per book id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book with quantity 1.
    ///
    /// Returns `false` (and changes nothing) when the book is already in
    /// the cart.
    pub fn add(&mut self, book: &Book) -> bool {
        self.add_line(CartLine::from_book(book))
    }

    /// Add a prepared line. Its quantity is normalized to at least
    /// [`MIN_QUANTITY`]. Duplicate book ids are ignored.
    pub fn add_line(&mut self, mut line: CartLine) -> bool {
        if self.contains(line.book_id) {
            return false;
        }
        line.quantity = line.quantity.max(MIN_QUANTITY);
        self.lines.push(line);
        true
    }

    /// Remove the line for `book_id`. Removing an absent book is a no-op.
    pub fn remove(&mut self, book_id: DbId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.book_id != book_id);
        self.lines.len() != before
    }

    /// The listing's "Add to cart" checkbox: checked adds, unchecked removes.
    pub fn toggle(&mut self, book: &Book, selected: bool) -> bool {
        if selected {
            self.add(book)
        } else {
            self.remove(book.book_id)
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below [`MIN_QUANTITY`] are rejected and leave the line
    /// untouched. Returns `Ok(false)` when no line matches.
    pub fn update_quantity(&mut self, book_id: DbId, quantity: i64) -> Result<bool, CoreError> {
        if quantity < i64::from(MIN_QUANTITY) {
            return Err(CoreError::Validation(format!(
                "Quantity must be at least {MIN_QUANTITY}, got {quantity}"
            )));
        }
        let quantity = u32::try_from(quantity).map_err(|_| {
            CoreError::Validation(format!("Quantity {quantity} is too large"))
        })?;

        match self.lines.iter_mut().find(|l| l.book_id == book_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price x quantity over all lines. Computed on every call.
    pub fn total_amount(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn contains(&self, book_id: DbId) -> bool {
        self.lines.iter().any(|l| l.book_id == book_id)
    }

    pub fn get(&self, book_id: DbId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.book_id == book_id)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Order items for checkout, in cart order.
    pub fn order_items(&self) -> Vec<NewOrderItem> {
        self.lines
            .iter()
            .map(|l| NewOrderItem {
                book_id: l.book_id,
                quantity: l.quantity,
            })
            .collect()
    }
}
