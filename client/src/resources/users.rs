use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::resources::ListParams;
use crate::types::{Page, User, UserForm};
use crate::ApiClient;

/// `/user/` endpoints
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /user/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn create(&self, form: &UserForm) -> Result<User, ApiError> {
        self.client
            .result(ApiRequest::post("/user/").with_json(form)?)
            .await
    }

    /// `GET /user/{id}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn get(&self, id: u64) -> Result<User, ApiError> {
        self.client.result(ApiRequest::get(format!("/user/{id}/"))).await
    }

    /// `POST /user/{id}/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn update(&self, id: u64, form: &UserForm) -> Result<User, ApiError> {
        self.client
            .result(ApiRequest::post(format!("/user/{id}/")).with_json(form)?)
            .await
    }

    /// `GET /user/` with paging and filters
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn list(&self, params: &ListParams) -> Result<Page<User>, ApiError> {
        self.client
            .body(ApiRequest::get("/user/").with_query(params.to_query()))
            .await
    }
}
