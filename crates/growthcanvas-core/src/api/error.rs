use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::SessionError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session expired - please log in again")]
    AuthExpired,

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Login failed: {0}")]
    InvalidCredentials(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Human-readable message from an error body.
    ///
    /// Understands `{"detail": "..."}`, validation lists of the form
    /// `{"detail": [{"msg": "..."}, ...]}`, and `{"message": "..."}`.
    /// Anything else is returned as the (truncated) raw body.
    pub fn error_message(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            match value.get("detail") {
                Some(serde_json::Value::String(detail)) => return detail.clone(),
                Some(serde_json::Value::Array(items)) => {
                    let messages: Vec<&str> = items
                        .iter()
                        .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                        .collect();
                    if !messages.is_empty() {
                        return messages.join("; ");
                    }
                }
                _ => {}
            }
            if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
        Self::truncate_body(body)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::error_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::Rejected { status, message },
        }
    }

    /// True when the caller should send the user back to the login screen
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::AuthExpired | ApiError::Unauthorized | ApiError::InvalidCredentials(_)
        )
    }

    /// Message suitable for showing to a user.
    /// Transport failures get a generic message; backend messages are shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::AuthExpired | ApiError::Unauthorized => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::InvalidCredentials(detail) => detail.clone(),
            ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::ServerError(message)
            | ApiError::Rejected { message, .. } => message.clone(),
            ApiError::InvalidResponse(_) => "Error loading data".to_string(),
            other => other.to_string(),
        }
    }
}
