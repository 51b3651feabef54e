use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::ApiClient;
use serde_json::Value;

/// `/stats/` endpoints
///
/// Statistics payloads are passed through undecoded.
#[derive(Debug, Clone, Copy)]
pub struct Stats<'a> {
    client: &'a ApiClient,
}

impl<'a> Stats<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /stats/server/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn server(&self) -> Result<Value, ApiError> {
        self.client.result(ApiRequest::get("/stats/server/")).await
    }

    /// `GET /stats/download/package/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn downloads(&self) -> Result<Value, ApiError> {
        self.client
            .result(ApiRequest::get("/stats/download/package/"))
            .await
    }

    /// `GET /stats/download/package/{id}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn package_downloads(&self, id: u64) -> Result<Value, ApiError> {
        self.client
            .result(ApiRequest::get(format!("/stats/download/package/{id}/")))
            .await
    }

    /// `GET /stats/download/package/{id}/version/{version_id}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn version_downloads(&self, id: u64, version_id: u64) -> Result<Value, ApiError> {
        self.client
            .result(ApiRequest::get(format!(
                "/stats/download/package/{id}/version/{version_id}/"
            )))
            .await
    }
}
