use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::types::FeatureForm;
use crate::ApiClient;

/// `/feature/`
#[derive(Debug, Clone, Copy)]
pub struct Features<'a> {
    client: &'a ApiClient,
}

impl<'a> Features<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /feature/{id}/` with `{"value": value}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn update(&self, id: &str, value: bool) -> Result<(), ApiError> {
        self.client
            .call(ApiRequest::post(format!("/feature/{id}/")).with_json(&FeatureForm { value })?)
            .await
            .map(|_| ())
    }
}
