use bookstore_core::models::{Order, User};
use bookstore_core::routes::Route;

use crate::app::Storefront;
use crate::scope::ViewScope;
use crate::views::Page;

pub const NO_ORDERS: &str = "You don't have any orders yet.";

#[derive(Debug, Clone, PartialEq)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    /// Full record of the logged-in user, when the user list loaded.
    pub owner: Option<User>,
}

/// `/orders`. Anonymous visitors are sent back to the catalog.
///
/// Orders and the user list are fetched concurrently; either failing is
/// reported and degrades to an empty list or missing owner details.
pub async fn load(app: &Storefront, scope: &ViewScope) -> Option<Page> {
    let Some(user) = app.session().current().user().cloned() else {
        return Some(Page::Redirect(Route::Catalog));
    };

    let backend = app.backend();
    let (orders, users) = scope
        .run(async { tokio::join!(backend.list_orders(user.user_id), backend.list_users()) })
        .await?;

    let orders = orders.unwrap_or_else(|e| {
        tracing::warn!(user_id = user.user_id, error = %e, "Failed to load orders");
        app.notices().error("Failed to load orders");
        Vec::new()
    });
    let owner = match users {
        Ok(users) => users.into_iter().find(|u| u.user_id == user.user_id),
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "Failed to load user info");
            app.notices().error("Failed to load user info");
            None
        }
    };

    Some(Page::Orders(OrdersPage { orders, owner }))
}
