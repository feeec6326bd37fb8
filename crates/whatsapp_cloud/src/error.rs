//! Error types for the WhatsApp Cloud API client

use thiserror::Error;

/// Errors that can occur while building or sending WhatsApp messages
#[derive(Debug, Error)]
pub enum WhatsAppError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Graph API returned an error object
    #[error("API error (status {status}): {code} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Graph API error code
        code: i32,
        /// Graph API error message
        message: String,
    },

    /// Non-2xx response without a parseable Graph error object
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Missing or invalid configuration
    #[error("Missing configuration: {0}")]
    Configuration(String),

    /// Interactive item rejected under the strict policy
    #[error("Invalid interactive item at index {index}: {reason}")]
    InvalidInteractive {
        /// Position of the offending item
        index: usize,
        /// What the item was missing
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WhatsAppError {
    /// Create a configuration error
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// HTTP status attached to this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is worth retrying
    ///
    /// The client never retries on its own; this is for callers that layer
    /// retries on top.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } | Self::Status { status, .. } => {
                *status == 429 || *status >= 500
            },
            _ => false,
        }
    }
}
