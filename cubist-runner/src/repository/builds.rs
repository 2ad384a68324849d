//! Builds repository
//!
//! Handles communication with the analytics server for build-related
//! operations:
//! - Looking up a cube's data model id
//! - Submitting builds
//! - Fetching build status

use async_trait::async_trait;
use cubist_client::{AnalyticsClient, Result};
use cubist_core::domain::build::{BuildHandle, ModelId};
use cubist_core::dto::build::{BuildCreated, BuildState, CreateBuild};

/// Repository trait for build-related operations with the analytics server
#[async_trait]
pub trait BuildRepository: Send + Sync {
    /// Looks up the data model id of a cube
    ///
    /// Returns `Ok(None)` when the server answered but had no `oid` for the
    /// cube.
    async fn lookup_model(&self, cube_name: &str) -> Result<Option<ModelId>>;

    /// Submits one build request
    async fn submit_build(&self, request: &CreateBuild) -> Result<BuildCreated>;

    /// Fetches the current state of a build
    async fn build_status(&self, handle: &BuildHandle) -> Result<BuildState>;
}

/// HTTP implementation of BuildRepository
pub struct HttpBuildRepository {
    client: AnalyticsClient,
}

impl HttpBuildRepository {
    /// Creates a new HTTP build repository
    ///
    /// # Arguments
    /// * `client` - An authenticated analytics server client
    pub fn new(client: AnalyticsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BuildRepository for HttpBuildRepository {
    async fn lookup_model(&self, cube_name: &str) -> Result<Option<ModelId>> {
        let lookup = self.client.datamodel_schema(cube_name).await?;
        Ok(lookup.model_id())
    }

    async fn submit_build(&self, request: &CreateBuild) -> Result<BuildCreated> {
        self.client.create_build(request).await
    }

    async fn build_status(&self, handle: &BuildHandle) -> Result<BuildState> {
        self.client.get_build(handle).await
    }
}
