//! Authentication state.
//!
//! The storefront is either anonymous or authenticated as exactly one
//! user. Encoding this as an enum makes "logged in iff a user is present"
//! hold by construction.

use crate::error::CoreError;
use crate::models::User;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }

    /// The logged-in user, or `Unauthorized` with `action` in the message.
    pub fn require_user(&self, action: &str) -> Result<&User, CoreError> {
        self.user().ok_or_else(|| {
            CoreError::Unauthorized(format!("You must be logged in to {action}."))
        })
    }

    /// The logged-in admin, or `Forbidden`.
    pub fn require_admin(&self) -> Result<&User, CoreError> {
        match self.user() {
            Some(user) if user.is_admin => Ok(user),
            _ => Err(CoreError::Forbidden(ACCESS_DENIED.to_string())),
        }
    }
}

/// Static message shown instead of admin-only pages.
pub const ACCESS_DENIED: &str = "Access denied: admins only";
