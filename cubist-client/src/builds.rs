//! Build API endpoints

use crate::AnalyticsClient;
use crate::error::Result;
use cubist_core::domain::build::BuildHandle;
use cubist_core::dto::build::{BuildCreated, BuildState, CreateBuild};

impl AnalyticsClient {
    // =============================================================================
    // Build Lifecycle
    // =============================================================================

    /// Submit a build of a data model
    ///
    /// `POST /api/v2/builds`
    ///
    /// # Example
    /// ```no_run
    /// # use cubist_client::AnalyticsClient;
    /// # use cubist_core::domain::build::ModelId;
    /// # use cubist_core::domain::job::BuildType;
    /// # use cubist_core::dto::build::CreateBuild;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = AnalyticsClient::new("analytics.example.com").with_token("Bearer abc");
    /// let created = client
    ///     .create_build(&CreateBuild::new(ModelId::new("5f1e..."), BuildType::ByTable))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_build(&self, req: &CreateBuild) -> Result<BuildCreated> {
        let url = self.url("/api/v2/builds");
        let request = self.client.post(&url).json(req);
        let response = self.authorize(request).send().await?;

        self.handle_response(response).await
    }

    /// Get the current state of a build
    ///
    /// `GET /api/v2/builds/{oid}`
    pub async fn get_build(&self, handle: &BuildHandle) -> Result<BuildState> {
        let url = self.url(&format!("/api/v2/builds/{}", handle));
        let request = self.client.get(&url);
        let response = self.authorize(request).send().await?;

        self.handle_response(response).await
    }
}
