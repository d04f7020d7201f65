//! Photo server response types
//!
//! Bodies returned by `/check` and `/submit`. Every field is optional on the
//! wire; the server omits what it has nothing to say about.

use serde::{Deserialize, Serialize};

/// `GET /check` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub message: Option<String>,

    /// Storage path of the existing file on the server
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub status: Option<u16>,
}

/// `POST /submit` success body, and the body of a 409 conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: Option<String>,

    /// Name the server stored the file under
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub status: Option<u16>,
}

/// Error body: `{"error": ...}`.
///
/// `error` is usually a string, but some failures serialize an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Best human-readable message from the body
    pub fn message(&self) -> Option<String> {
        match &self.error {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}
