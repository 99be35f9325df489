use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session is missing or expired")]
    Unauthorized { detail: Option<String> },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request rejected with status {status}")]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape produced by the backend (`{"detail": "..."}`).
/// Validation errors carry a list instead of a string; those are ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable `detail` string out of an error body.
    pub fn extract_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(detail) if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized {
                detail: Self::extract_detail(body),
            },
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::Rejected {
                status,
                detail: Self::extract_detail(body),
            },
        }
    }

    /// Whether this error means the session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Message the backend attached to the failure, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Rejected { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_codes() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized { detail: None }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "no"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, ""),
            ApiError::Rejected { status, .. } if status == StatusCode::BAD_REQUEST
        ));
    }

    #[test]
    fn test_detail_extraction() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Invalid login or security key"}"#,
        );
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Invalid login or security key"));

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": "User exists"}"#);
        assert_eq!(err.detail(), Some("User exists"));

        // Validation errors use a list, which is not a display message
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "login"], "msg": "field required"}]}"#,
        );
        assert_eq!(err.detail(), None);

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "not json");
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("{} total bytes)", long.len())));

        let short = "x".repeat(MAX_ERROR_BODY_LENGTH);
        assert_eq!(ApiError::truncate_body(&short), short);
    }

    #[test]
    fn test_truncate_body_backs_off_to_char_boundary() {
        // The limit falls inside the two-byte character after the leading `x`
        let body = format!("x{}", "ж".repeat(MAX_ERROR_BODY_LENGTH));
        assert!(!body.is_char_boundary(MAX_ERROR_BODY_LENGTH));

        let truncated = ApiError::truncate_body(&body);
        let kept = truncated.split("... (truncated").next().unwrap_or_default();
        assert_eq!(kept.len(), MAX_ERROR_BODY_LENGTH - 1);
        assert!(body.starts_with(kept));
        assert!(kept.len() < body.len());
        assert!(truncated.ends_with(&format!("{} total bytes)", body.len())));
    }
}
