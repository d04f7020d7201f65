use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Network unreachable, timed out, or the peer answered with something unreadable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The peer answered with a status the caller does not treat as success.
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid content reference: {0}")]
    InvalidContent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the failure happened below the application protocol.
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_) | BridgeError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(BridgeError::Transport("connection refused".to_string()).is_transport());
        assert!(BridgeError::Io(std::io::Error::other("broken pipe")).is_transport());
        assert!(!BridgeError::Status {
            status: 500,
            message: "boom".to_string()
        }
        .is_transport());
    }

    #[test]
    fn test_status_display() {
        let error = BridgeError::Status {
            status: 400,
            message: "No filename provided".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unexpected status 400: No filename provided"
        );
    }
}
