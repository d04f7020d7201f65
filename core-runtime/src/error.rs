use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_missing_display() {
        let err = Error::CapabilityMissing {
            capability: "InventorySource".to_string(),
            message: "inject a photo library adapter".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Capability missing: InventorySource - inject a photo library adapter"
        );
    }
}
