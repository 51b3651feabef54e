use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::types::LoginForm;
use crate::ApiClient;

/// `/login/`
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /login/`, returning the token from the `authorization` header
    ///
    /// The token is returned as-is; storing it is up to the caller.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the round trip, or [`ApiError::MissingToken`]
    /// when the header is absent or empty.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post("/login/").with_json(&LoginForm { username, password })?;
        let response = self.client.call(request).await?;

        response
            .header("authorization")
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .ok_or(ApiError::MissingToken)
    }
}
