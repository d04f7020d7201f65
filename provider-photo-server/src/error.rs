//! Error types for the photo server provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Photo server provider errors
#[derive(Error, Debug)]
pub enum PhotoServerError {
    /// The server answered with a status the protocol does not expect
    #[error("Photo server error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// A success response whose body could not be read
    #[error("Failed to parse photo server response: {0}")]
    ParseError(String),

    /// The configured base URL is unusable
    #[error("Invalid photo server URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for photo server operations
pub type Result<T> = std::result::Result<T, PhotoServerError>;

impl From<PhotoServerError> for BridgeError {
    fn from(error: PhotoServerError) -> Self {
        match error {
            PhotoServerError::ApiError {
                status_code,
                message,
            } => BridgeError::Status {
                status: status_code,
                message,
            },
            PhotoServerError::ParseError(msg) => {
                BridgeError::Transport(format!("Malformed response: {}", msg))
            }
            PhotoServerError::InvalidUrl(msg) => {
                BridgeError::OperationFailed(format!("Invalid photo server URL: {}", msg))
            }
            PhotoServerError::BridgeError(e) => e,
        }
    }
}
