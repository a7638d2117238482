//! # API Error Type
//!
//! Every transport failure is normalized into one `ApiError` shape.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Error Flow in the Toko Client                  │
//! │                                                                 │
//! │  reqwest failure (no response) ──► ErrorKind::Network           │
//! │                                                                 │
//! │  HTTP 401 / 403 ─────────────────► ErrorKind::Auth              │
//! │                                                                 │
//! │  HTTP 422 ───────────────────────► ErrorKind::Validation        │
//! │                                    (+ field-keyed messages)     │
//! │                                                                 │
//! │  other 4xx / 5xx ────────────────► ErrorKind::Api               │
//! │                                                                 │
//! │  unexpected body shape ──────────► ErrorKind::Unknown           │
//! │                                                                 │
//! │  Stores copy `.to_string()` into their `error` field and        │
//! │  propagate the error itself to the caller.                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// Client-side classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response was received at all.
    Network,
    /// 401 or 403.
    Auth,
    /// 422 with field-keyed message lists.
    Validation,
    /// Any other 4xx/5xx.
    Api,
    /// Anything that does not fit the taxonomy (decode failures, bugs).
    Unknown,
}

/// A normalized API failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    /// Human-readable message, ready for display.
    pub message: String,
    /// Field-keyed validation messages (422 only).
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            status,
            message: message.into(),
            errors: None,
        }
    }

    /// No response received from the server.
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::new(ErrorKind::Network, 0, message)
    }

    /// An operation required authentication before any request was made.
    pub fn auth_required() -> Self {
        ApiError::new(
            ErrorKind::Auth,
            0,
            "Authentication required. Please log in to continue.",
        )
    }

    /// A 2xx body that did not match the expected shape.
    pub fn decode(err: serde_json::Error) -> Self {
        ApiError::new(
            ErrorKind::Unknown,
            0,
            format!("Unexpected response shape: {}", err),
        )
    }

    /// Classifies an HTTP error response.
    ///
    /// The body's `message` wins when present; otherwise a per-status
    /// default is used. 422 bodies also carry `errors`, a field-keyed map
    /// of message lists.
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let kind = match status {
            401 | 403 => ErrorKind::Auth,
            422 => ErrorKind::Validation,
            400..=599 => ErrorKind::Api,
            _ => ErrorKind::Unknown,
        };

        let message = body
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default_message(status).to_string());

        let errors = body
            .and_then(|b| b.get("errors"))
            .and_then(|e| serde_json::from_value(e.clone()).ok());

        ApiError {
            kind,
            status,
            message,
            errors,
        }
    }

    /// Retry is only worthwhile when the failure may be transient:
    /// network errors and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Network || self.status >= 500
    }

    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Auth
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    /// Field-keyed validation messages, if this is a 422.
    pub fn validation_errors(&self) -> Option<&HashMap<String, Vec<String>>> {
        if self.is_validation() {
            self.errors.as_ref()
        } else {
            None
        }
    }

    /// First validation message for one field.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.validation_errors()?
            .get(field)?
            .first()
            .map(String::as_str)
    }
}

/// Per-status fallback messages, used when the body carries none.
fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request. Please check your input.",
        401 => "You are not authenticated. Please log in.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        422 => "Validation failed. Please check your input.",
        429 => "Too many requests. Please try again later.",
        500 => "Server error. Please try again later.",
        503 => "Service temporarily unavailable. Please try again later.",
        _ => "An unexpected error occurred.",
    }
}

/// Convenience type alias for transport results.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification_by_status() {
        assert_eq!(ApiError::from_response(401, None).kind, ErrorKind::Auth);
        assert_eq!(ApiError::from_response(403, None).kind, ErrorKind::Auth);
        assert_eq!(
            ApiError::from_response(422, None).kind,
            ErrorKind::Validation
        );
        assert_eq!(ApiError::from_response(404, None).kind, ErrorKind::Api);
        assert_eq!(ApiError::from_response(500, None).kind, ErrorKind::Api);
    }

    #[test]
    fn test_body_message_wins() {
        let body = json!({"message": "Stok tidak mencukupi"});
        let err = ApiError::from_response(400, Some(&body));
        assert_eq!(err.message, "Stok tidak mencukupi");

        let err = ApiError::from_response(404, None);
        assert_eq!(err.message, "The requested resource was not found.");
    }

    #[test]
    fn test_validation_errors_parsed() {
        let body = json!({
            "message": "Validation failed",
            "errors": {
                "email": ["email is required"],
                "password": ["password must be at least 8 characters"]
            }
        });
        let err = ApiError::from_response(422, Some(&body));

        assert!(err.is_validation());
        assert_eq!(err.field_error("email"), Some("email is required"));
        assert_eq!(err.validation_errors().unwrap().len(), 2);
    }

    #[test]
    fn test_validation_errors_only_on_422() {
        let body = json!({"errors": {"email": ["nope"]}});
        let err = ApiError::from_response(400, Some(&body));
        assert!(err.validation_errors().is_none());
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::network("timed out").is_retryable());
        assert!(ApiError::from_response(500, None).is_retryable());
        assert!(ApiError::from_response(503, None).is_retryable());
        assert!(!ApiError::from_response(404, None).is_retryable());
        assert!(!ApiError::from_response(422, None).is_retryable());
        assert!(!ApiError::auth_required().is_retryable());
    }
}
