use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::types::License;
use crate::ApiClient;

/// `/license/`
#[derive(Debug, Clone, Copy)]
pub struct Licenses<'a> {
    client: &'a ApiClient,
}

impl<'a> Licenses<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /license/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn list(&self) -> Result<Vec<License>, ApiError> {
        self.client.result(ApiRequest::get("/license/")).await
    }
}
