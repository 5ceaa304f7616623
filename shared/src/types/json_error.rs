use serde::{Deserialize, Serialize};

/// Error envelope for requests that never reach business logic.
///
/// Business outcomes ride their endpoint's status enum on HTTP 200; this
/// shape is reserved for routing misses and unreadable bodies.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new("NOT_FOUND", &format!("No route for {}", path))
    }

    pub fn method_not_allowed() -> Self {
        Self::new("METHOD_NOT_ALLOWED", "Method not allowed for this route")
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}
