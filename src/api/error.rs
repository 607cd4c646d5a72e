use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server explicitly rejected the presented credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The session could not be recovered after a refresh attempt and has
    /// been cleared; the user must log in again
    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    /// Transport-level failure: no response was received. Never triggers
    /// a refresh attempt.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// FastAPI-style error payload: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Extract the server-provided reason from a `{"detail": ...}` payload,
    /// falling back to the (truncated) raw body.
    fn detail_or_body(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.detail,
            Err(_) if body.trim().is_empty() => "no error detail provided".to_string(),
            Err(_) => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let reason = Self::detail_or_body(body);
        match status.as_u16() {
            401 | 403 => ApiError::Auth(reason),
            404 => ApiError::NotFound(reason),
            500..=599 => ApiError::ServerError(reason),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, reason)),
        }
    }

    /// Whether this error means the presented credential was rejected
    /// (as opposed to a transport or server-side failure).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Auth(_) | ApiError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_detail() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Incorrect credentials"}"#,
        );
        match err {
            ApiError::Auth(msg) => assert_eq!(msg, "Incorrect credentials"),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_falls_back_to_raw_body() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "gone");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "gone"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_empty_body() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        match err {
            ApiError::Auth(msg) => assert_eq!(msg, "no error detail provided"),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_server_error() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Internal server error"}"#,
        );
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        match err {
            ApiError::ServerError(msg) => {
                assert!(msg.len() < 600);
                assert!(msg.contains("truncated"));
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(ApiError::Auth("bad".into()).is_auth_failure());
        assert!(ApiError::SessionExpired.is_auth_failure());
        assert!(!ApiError::NotFound("missing".into()).is_auth_failure());
    }
}
