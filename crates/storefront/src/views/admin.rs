//! The admin page and the operations reachable from it.
//!
//! Every operation checks for an admin session before touching the
//! backend.

use bookstore_core::error::CoreError;
use bookstore_core::models::{NewUser, Order, SpendingRange, SpendingReport, User, UserUpdate};
use bookstore_core::session::ACCESS_DENIED;
use bookstore_core::types::DbId;

use crate::app::Storefront;
use crate::error::StorefrontResult;
use crate::scope::ViewScope;
use crate::views::Page;

/// Shown when the add-user form is incomplete.
pub const MISSING_FIELDS: &str = "Please fill all required fields!";

#[derive(Debug, Clone, PartialEq)]
pub struct AdminPage {
    pub users: Vec<User>,
}

/// `/admin`: the user table.
pub async fn load(app: &Storefront, scope: &ViewScope) -> Option<Page> {
    if app.session().require_admin().is_err() {
        return Some(Page::Message(ACCESS_DENIED.to_string()));
    }

    let users = match scope.run(app.backend().list_users()).await? {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load users");
            app.notices().error("Failed to load users");
            Vec::new()
        }
    };
    Some(Page::Admin(AdminPage { users }))
}

/// Orders placed by `user_id`.
pub async fn user_orders(app: &Storefront, user_id: DbId) -> StorefrontResult<Vec<Order>> {
    app.session().require_admin()?;
    Ok(app.backend().list_orders(user_id).await?)
}

/// Total spent by `user_id` between two `YYYY-MM-DD` dates, inclusive.
pub async fn spending(
    app: &Storefront,
    user_id: DbId,
    start: &str,
    end: &str,
) -> StorefrontResult<SpendingReport> {
    app.session().require_admin()?;
    let range = SpendingRange::parse(start, end)?;
    Ok(app.backend().calculate_spending(user_id, range).await?)
}

/// Change one editable column of a user and save the whole record.
pub async fn update_user(
    app: &Storefront,
    user_id: DbId,
    field: &str,
    value: &str,
) -> StorefrontResult<User> {
    app.session().require_admin()?;
    let current = app
        .backend()
        .list_users()
        .await?
        .into_iter()
        .find(|u| u.user_id == user_id)
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })?;

    let mut update = UserUpdate::from_user(&current);
    update.set_field(field, value)?;
    let saved = app.backend().update_user(user_id, &update).await?;
    tracing::info!(user_id, %field, "User updated");
    Ok(saved)
}

pub async fn delete_user(app: &Storefront, user_id: DbId) -> StorefrontResult<()> {
    app.session().require_admin()?;
    app.backend().delete_user(user_id).await?;
    tracing::info!(user_id, "User deleted");
    Ok(())
}

/// Create a user from the admin form. First name, last name, email and
/// password are required.
pub async fn add_user(app: &Storefront, user: &NewUser) -> StorefrontResult<User> {
    app.session().require_admin()?;
    user.check()
        .map_err(|_| CoreError::Validation(MISSING_FIELDS.to_string()))?;
    let created = app.backend().create_user(user).await?;
    tracing::info!(user_id = created.user_id, "User added");
    Ok(created)
}

/// Delete a book and drop it from the cached catalog.
pub async fn delete_book(app: &Storefront, book_id: DbId) -> StorefrontResult<()> {
    app.session().require_admin()?;
    app.backend().delete_book(book_id).await?;
    app.catalog().remove(book_id).await;
    tracing::info!(book_id, "Book deleted");
    Ok(())
}
