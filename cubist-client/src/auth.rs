//! Authentication endpoint

use reqwest::RequestBuilder;
use reqwest::header::ACCEPT;

use crate::AnalyticsClient;
use crate::error::{ClientError, Result};
use cubist_core::dto::auth::{LoginRequest, LoginResponse};

impl AnalyticsClient {
    /// Log in with a username and password
    ///
    /// `POST /api/v1/authentication/login` with a form-encoded body.
    ///
    /// # Returns
    /// The `authorization` header value (`Bearer {access_token}`) to pass to
    /// [`AnalyticsClient::with_token`].
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response = self.login_request(username, password).send().await?;
        let login: LoginResponse = self.handle_response(response).await?;

        bearer_token_for(login, username)
    }

    fn login_request(&self, username: &str, password: &str) -> RequestBuilder {
        self.client
            .post(self.url("/api/v1/authentication/login"))
            .header(ACCEPT, "application/json")
            .form(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
    }
}

/// A decoded login response without `success: true` and a token is a rejection
fn bearer_token_for(login: LoginResponse, username: &str) -> Result<String> {
    login.bearer_token().ok_or_else(|| {
        ClientError::AuthenticationFailed(format!("login rejected for user '{}'", username))
    })
}
