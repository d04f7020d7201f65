use crate::models::RecordId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog record {0} does not exist")]
    RecordNotFound(RecordId),

    /// A value was rejected before reaching the database
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Catalog schema migration failed: {0}")]
    Migration(String),
}

impl LibraryError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        LibraryError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
