use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::types::{Package, PasswordForm, ProfileForm, User};
use crate::ApiClient;

/// `/me/` endpoints for the logged-in user
#[derive(Debug, Clone, Copy)]
pub struct Me<'a> {
    client: &'a ApiClient,
}

impl<'a> Me<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /me/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn get(&self) -> Result<User, ApiError> {
        self.client.result(ApiRequest::get("/me/")).await
    }

    /// `POST /me/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn update(&self, form: &ProfileForm) -> Result<User, ApiError> {
        self.client
            .result(ApiRequest::post("/me/").with_json(form)?)
            .await
    }

    /// `POST /me/password/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn change_password(&self, form: &PasswordForm) -> Result<(), ApiError> {
        self.client
            .call(ApiRequest::post("/me/password/").with_json(form)?)
            .await
            .map(|_| ())
    }

    /// `GET /me/package/`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip.
    pub async fn packages(&self) -> Result<Vec<Package>, ApiError> {
        self.client.result(ApiRequest::get("/me/package/")).await
    }
}
