//! Error types for the admin API client

use thiserror::Error;

/// The request never produced a response (connection refused, DNS, TLS...)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self(error.to_string())
    }
}

/// Errors that can occur when calling the admin API
#[derive(Debug, Error)]
pub enum ApiError {
    /// An interceptor handled the reply (session expiry, server fault)
    ///
    /// Nothing should be reported for it; the interceptor already did.
    #[error("Reply was handled by an interceptor")]
    Absorbed,

    /// The server answered with a non-success status
    #[error("{status_text} [{url}]")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Reason phrase for the status
        status_text: String,
        /// Request path and query
        url: String,
    },

    /// No response was received
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// Response body did not have the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Login succeeded but the response carried no `authorization` header
    #[error("Login response carried no authorization token")]
    MissingToken,
}

impl ApiError {
    /// Human readable reason, as shown to operators
    ///
    /// For rejections this is the bare reason phrase (`Not Found`).
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected { status_text, .. } => status_text.clone(),
            other => other.to_string(),
        }
    }

    /// Whether an interceptor already dealt with this failure
    #[must_use]
    pub const fn is_absorbed(&self) -> bool {
        matches!(self, Self::Absorbed)
    }

    /// HTTP status for rejections
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
