use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::types::Info;
use crate::ApiClient;

/// `/info/`
#[derive(Debug, Clone, Copy)]
pub struct InfoResource<'a> {
    client: &'a ApiClient,
}

impl<'a> InfoResource<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /info/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn get(&self) -> Result<Info, ApiError> {
        self.client.result(ApiRequest::get("/info/")).await
    }
}
