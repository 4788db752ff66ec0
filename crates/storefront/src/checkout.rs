//! Turning the cart into an order.

use bookstore_client::StoreBackend;
use bookstore_core::cart::Cart;
use bookstore_core::error::CoreError;
use bookstore_core::models::{NewOrder, Order};
use bookstore_core::types::Date;
use tokio::sync::Mutex;

use crate::error::StorefrontResult;
use crate::session::SessionStore;

pub const ORDER_PLACED: &str = "Order placed successfully!";
pub const ORDER_FAILED: &str = "Error while placing order.";

/// Submit the whole cart as one order dated `today`.
///
/// Requires a logged-in user and a non-empty cart. The cart is cleared
/// only after the backend accepts the order; on any failure it is left
/// exactly as it was.
pub async fn place_order(
    backend: &dyn StoreBackend,
    session: &SessionStore,
    cart: &Mutex<Cart>,
    today: Date,
) -> StorefrontResult<Order> {
    let user = session.require_user("place an order")?;

    let mut cart = cart.lock().await;
    if cart.is_empty() {
        return Err(CoreError::Validation("Your cart is empty.".to_string()).into());
    }

    let order = NewOrder {
        user_id: user.user_id,
        order_date: today,
        order_items: cart.order_items(),
    };
    order.validate()?;

    let created = backend.create_order(&order).await.map_err(|e| {
        tracing::error!(user_id = user.user_id, error = %e, "Order submission failed");
        e
    })?;

    tracing::info!(
        user_id = user.user_id,
        order_id = created.order_id,
        lines = order.order_items.len(),
        "Order placed",
    );
    cart.clear();
    Ok(created)
}
