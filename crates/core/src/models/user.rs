//! User models, login/registration forms and admin edit DTOs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::types::DbId;

/// Loose email shape check used by the registration form: something, an
/// `@`, something, a dot, something.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+@\S+\.\S+").unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

/// Public user record.
///
/// Returned by `users/login/` and `users/check-auth/` (without phone and
/// address) and by `GET users/` (complete). This is also the shape of
/// the persisted "remembered user" snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of a successful `users/login/` or `users/check-auth/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(CoreError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Create / register
// ---------------------------------------------------------------------------

/// Payload for `POST users/` (self-registration and admin "add user").
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub phone: String,
    pub address: String,
}

impl NewUser {
    /// Required-field check used by the admin "add user" form.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(first_message(&e)))
    }
}

/// The registration dialog: a [`NewUser`] plus password confirmation.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Validate in the order the dialog reports problems: mismatched
    /// confirmation, then email shape, then required fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.password != self.confirm_password {
            return Err(CoreError::Validation(
                "Passwords aren't matching".to_string(),
            ));
        }
        if !EMAIL_SHAPE.is_match(&self.email) {
            return Err(CoreError::Validation("Invalid email format".to_string()));
        }
        self.to_new_user().check()
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Admin edit
// ---------------------------------------------------------------------------

/// Payload for `PUT users/{id}/` from the admin table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Columns editable from the admin table.
pub const EDITABLE_USER_FIELDS: &[&str] = &["first_name", "last_name", "email", "phone", "address"];

impl UserUpdate {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
        }
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), CoreError> {
        let value = value.trim().to_string();
        match field {
            "first_name" => self.first_name = value,
            "last_name" => self.last_name = value,
            "email" => self.email = Some(value),
            "phone" => self.phone = Some(value),
            "address" => self.address = Some(value),
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown user field '{other}'. Must be one of: {}",
                    EDITABLE_USER_FIELDS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// Pick a deterministic message out of a [`ValidationErrors`] set:
/// the first failing field in alphabetical order.
fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
        .map(|(field, e)| match &e.message {
            Some(msg) => msg.to_string(),
            None => format!("{field} is invalid"),
        })
        .next()
        .unwrap_or_else(|| "Please fill all required fields!".to_string())
}
