//! REST client layer for the Pulse backend
//!
//! The backend speaks JSON; error bodies are shaped
//! `{ message?: string, fields?: { [field]: string } }`. Failures surface as
//! [`ApiError`] values that the telemetry layer classifies; this layer does
//! not notify or log by itself, and it never retries.

pub mod auth;
pub mod client;
pub mod customers;

pub use auth::{build_authorize_url, parse_oauth_callback, AuthApi, OAuthCallbackError};
pub use client::ApiClient;
pub use customers::{CustomerGateway, HttpCustomerGateway};

/// A failed backend interaction
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("backend returned HTTP {status}")]
    Status {
        status: u16,
        /// Parsed error body, when the backend sent JSON
        body: Option<serde_json::Value>,
    },

    /// The request got no response at all
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered but the payload did not parse
    #[error("failed to decode backend response: {0}")]
    Decode(String),

    /// The configured backend URL is not usable
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Status code and body for the HTTP error classifier.
    ///
    /// `Network` maps to status 0 (no response). Decode and URL faults are
    /// not HTTP failures and return `None`; callers report those as
    /// application faults instead.
    pub fn classification(&self) -> Option<(u16, Option<&serde_json::Value>)> {
        match self {
            ApiError::Status { status, body } => Some((*status, body.as_ref())),
            ApiError::Network(_) => Some((0, None)),
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_mapping() {
        let status = ApiError::Status {
            status: 404,
            body: Some(serde_json::json!({"message": "not found"})),
        };
        let (code, body) = status.classification().unwrap();
        assert_eq!(code, 404);
        assert!(body.is_some());

        let network = ApiError::Network("connection refused".to_string());
        assert_eq!(network.classification(), Some((0, None)));

        let decode = ApiError::Decode("expected struct Customer".to_string());
        assert!(decode.classification().is_none());
    }
}
