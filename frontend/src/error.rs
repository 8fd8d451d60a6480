//! Error type shared by the API client and the stores.

use community_hub_shared::ValidationErrors;
use thiserror::Error;

/// Shown when the server reports a failure without a message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failure of an API call or of caller-side validation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// No response was received.
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response whose body is not an API envelope.
    #[error("HTTP error: {status}")]
    Http {
        /// Response status code.
        status: u16,
    },

    /// `success: false` envelope.
    #[error("{message}")]
    Application {
        /// Server message, or the generic fallback.
        message: String,
        /// Field errors the server attached, if any.
        field_errors: ValidationErrors,
    },

    /// The response broke the envelope contract (e.g. `data` missing).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Rejected before any request was issued, or server field errors mapped
    /// back onto form fields.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A request body could not be encoded.
    #[error("Serialize error: {0}")]
    Serialize(String),
}

impl ClientError {
    /// Failure envelope; a blank message falls back to the generic one.
    pub fn application(message: Option<String>, field_errors: ValidationErrors) -> Self {
        Self::Application {
            message: message
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            field_errors,
        }
    }

    /// Message suitable for a toast or an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Unable to reach the server. Check your connection.".to_string(),
            Self::Http {
                ..
            } => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_falls_back_to_generic_message() {
        let err = ClientError::application(Some("  ".to_string()), ValidationErrors::new());
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);

        let message = Some("Comment not found".to_string());
        let err = ClientError::application(message, ValidationErrors::new());
        assert_eq!(err.user_message(), "Comment not found");
    }

    #[test]
    fn transport_errors_get_a_generic_user_message() {
        let err = ClientError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
        assert_eq!(err.user_message(), "Unable to reach the server. Check your connection.");
    }
}
