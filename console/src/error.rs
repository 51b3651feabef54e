//! Error type for console actions

use crate::config::ConfigError;
use crate::session::SessionError;
use gopypi_admin_client::ApiError;
use gopypi_admin_runtime::StoreError;
use thiserror::Error;

/// Errors returned by [`Console`](crate::Console) actions
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The API call failed (or was absorbed by an interceptor)
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session token could not be stored
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The store rejected a mutation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration was unusable
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConsoleError {
    /// Whether an interceptor already reported this failure
    #[must_use]
    pub const fn is_absorbed(&self) -> bool {
        matches!(self, Self::Api(ApiError::Absorbed))
    }

    /// Reason text suitable for a flash message
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Api(error) => error.reason(),
            other => other.to_string(),
        }
    }
}
