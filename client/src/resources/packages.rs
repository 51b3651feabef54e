use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::resources::ListParams;
use crate::types::{Package, Page};
use crate::ApiClient;

/// `/package/` endpoints
#[derive(Debug, Clone, Copy)]
pub struct Packages<'a> {
    client: &'a ApiClient,
}

impl<'a> Packages<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /package/` with paging and filters
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn list(&self, params: &ListParams) -> Result<Page<Package>, ApiError> {
        self.client
            .body(ApiRequest::get("/package/").with_query(params.to_query()))
            .await
    }

    /// `GET /package/{id}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn get(&self, id: u64) -> Result<Package, ApiError> {
        self.client
            .result(ApiRequest::get(format!("/package/{id}/")))
            .await
    }

    /// `POST /package/{id}/maintainer/{user}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn add_maintainer(&self, package: u64, user: u64) -> Result<(), ApiError> {
        self.client
            .call(ApiRequest::post(format!("/package/{package}/maintainer/{user}/")))
            .await
            .map(|_| ())
    }

    /// `DELETE /package/{id}/maintainer/{user}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn remove_maintainer(&self, package: u64, user: u64) -> Result<(), ApiError> {
        self.client
            .call(ApiRequest::delete(format!("/package/{package}/maintainer/{user}/")))
            .await
            .map(|_| ())
    }
}
