//! Cubist HTTP Client
//!
//! A small, typed client for the analytics server REST API used to rebuild
//! cubes: data model lookup, build submission, build status and login.
//!
//! Every request carries the configured `authorization` header. Only `200 OK`
//! and `201 Created` count as success; any other status, a failed send, or a
//! body that does not decode is a [`ClientError`].
//!
//! # Example
//!
//! ```no_run
//! use cubist_client::AnalyticsClient;
//! use cubist_core::domain::job::BuildType;
//! use cubist_core::dto::build::CreateBuild;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AnalyticsClient::new("analytics.example.com").with_token("Bearer abc");
//!
//!     let lookup = client.datamodel_schema("Sample Retail").await?;
//!     if let Some(model_id) = lookup.model_id() {
//!         let created = client.create_build(&CreateBuild::new(model_id, BuildType::Full)).await?;
//!         println!("Submitted build: {:?}", created.oid);
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod builds;
mod datamodels;
pub mod error;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the analytics server API
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    /// Base URL of the deployment (e.g., "https://analytics.example.com")
    base_url: String,
    /// Value of the `authorization` header, when one has been set
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl AnalyticsClient {
    /// Create a new client for a deployment
    ///
    /// `server` may be a bare host name (`analytics.example.com`), in which
    /// case `https://` is assumed, or a full base URL.
    ///
    /// # Example
    /// ```
    /// use cubist_client::AnalyticsClient;
    ///
    /// let client = AnalyticsClient::new("analytics.example.com");
    /// assert_eq!(client.base_url(), "https://analytics.example.com");
    /// ```
    pub fn new(server: impl AsRef<str>) -> Self {
        Self::with_client(server, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(server: impl AsRef<str>, client: Client) -> Self {
        Self {
            base_url: base_url_for(server.as_ref()),
            token: None,
            client,
        }
    }

    /// Create a new client whose requests time out after `timeout`
    pub fn with_timeout(server: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(server, client))
    }

    /// Set the `authorization` header value sent with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the deployment
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the authorization header, if any
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Any status other than 200 or 201 becomes [`ClientError::ApiError`] with
    /// the response body as message.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();

        if !is_accepted_status(status.as_u16()) {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                "Failed to get {} with HTTP status {}. Error {}",
                url,
                status.as_u16(),
                error_text
            );
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Statuses the analytics server uses for a successful call
fn is_accepted_status(status: u16) -> bool {
    matches!(status, 200 | 201)
}

/// Turn a configured server into a base URL without a trailing slash
fn base_url_for(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("https://{}", server)
    }
}
