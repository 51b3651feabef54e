//! # gopypi admin API client
//!
//! Rust client for the gopypi package index admin API.
//!
//! Every call goes through a [`Pipeline`]: an ordered list of
//! [`Interceptor`]s wrapped around a [`Transport`]. Interceptors can amend the
//! outgoing request, short-circuit it, and rewrite (or absorb) the reply.
//!
//! ## Example
//!
//! ```no_run
//! use gopypi_admin_client::{ApiClient, HttpTransport, ListParams, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(HttpTransport::new("http://localhost:9900/api"));
//!     let client = ApiClient::new(pipeline);
//!
//!     let page = client.packages().list(&ListParams::new().page(2)).await?;
//!     println!("{} packages on page 2", page.result.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod pipeline;
pub mod resources;
pub mod types;

use std::sync::Arc;

use serde::de::DeserializeOwned;

// Re-export main types for convenience
pub use error::{ApiError, TransportError};
pub use http::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use pipeline::{Interceptor, Pipeline, Reply, Step};
pub use resources::ListParams;
pub use types::{
    Envelope, Feature, Info, License, Package, PackageVersion, Page, Paginator, PasswordForm,
    ProfileForm, User, UserForm, FEATURE_DOWNLOAD_STATS,
};

/// Admin API client
///
/// Cheap to clone; all clones share one pipeline.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<Pipeline>,
}

impl ApiClient {
    /// Create a client that sends every request through `pipeline`
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// User administration
    #[must_use]
    pub const fn users(&self) -> resources::Users<'_> {
        resources::Users::new(self)
    }

    /// The logged-in user
    #[must_use]
    pub const fn me(&self) -> resources::Me<'_> {
        resources::Me::new(self)
    }

    /// Login
    #[must_use]
    pub const fn auth(&self) -> resources::Auth<'_> {
        resources::Auth::new(self)
    }

    /// Packages and maintainers
    #[must_use]
    pub const fn packages(&self) -> resources::Packages<'_> {
        resources::Packages::new(self)
    }

    /// Licenses
    #[must_use]
    pub const fn licenses(&self) -> resources::Licenses<'_> {
        resources::Licenses::new(self)
    }

    /// Server info and feature flags
    #[must_use]
    pub const fn info(&self) -> resources::InfoResource<'_> {
        resources::InfoResource::new(self)
    }

    /// Server and download statistics
    #[must_use]
    pub const fn stats(&self) -> resources::Stats<'_> {
        resources::Stats::new(self)
    }

    /// Feature flag updates
    #[must_use]
    pub const fn features(&self) -> resources::Features<'_> {
        resources::Features::new(self)
    }

    /// Run `request` through the pipeline and classify the reply
    ///
    /// # Errors
    ///
    /// - [`ApiError::Absorbed`] when an interceptor consumed the reply
    /// - [`ApiError::Rejected`] for any non-2xx status
    /// - [`ApiError::Transport`] when no response was received
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = request.url();

        match self.pipeline.execute(request).await {
            Reply::Response(response) if response.is_success() => Ok(response),
            Reply::Response(response) => Err(ApiError::Rejected {
                status: response.status,
                status_text: response.status_text,
                url,
            }),
            Reply::Failed(error) => Err(ApiError::Transport(error)),
            Reply::Absorbed => Err(ApiError::Absorbed),
        }
    }

    /// Run `request` and decode the `result` member of the response body
    ///
    /// # Errors
    ///
    /// Everything [`ApiClient::call`] returns, plus [`ApiError::Decode`] when
    /// the body does not match `T`.
    pub async fn result<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self.call(request).await?.json()?;
        Ok(envelope.result)
    }

    /// Run `request` and decode the whole response body
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::result`].
    pub async fn body<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.call(request).await?.json()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("interceptors", &self.pipeline.len())
            .finish_non_exhaustive()
    }
}
