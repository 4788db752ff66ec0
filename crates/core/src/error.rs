use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The human-readable part of the error, without the category prefix.
    ///
    /// This is what the storefront shows in a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::NotFound { entity, id } => format!("{entity} {id} not found"),
            CoreError::Validation(msg)
            | CoreError::Unauthorized(msg)
            | CoreError::Forbidden(msg)
            | CoreError::Internal(msg) => msg.clone(),
        }
    }
}
