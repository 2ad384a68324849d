//! Data model API endpoints

use reqwest::RequestBuilder;

use crate::AnalyticsClient;
use crate::error::Result;
use cubist_core::dto::datamodel::SchemaLookup;

impl AnalyticsClient {
    /// Look up the schema of a cube by title, requesting only its `oid`
    ///
    /// `GET /api/v2/datamodels/schema?title={cube}&fields=oid`
    ///
    /// A successful response without an `oid` is returned as-is; use
    /// [`SchemaLookup::model_id`] to tell the two apart.
    pub async fn datamodel_schema(&self, cube_name: &str) -> Result<SchemaLookup> {
        let response = self.schema_request(cube_name).send().await?;

        self.handle_response(response).await
    }

    fn schema_request(&self, cube_name: &str) -> RequestBuilder {
        // Form encoding sends a space in the title as `+`, not `%20`.
        let request = self
            .client
            .get(self.url("/api/v2/datamodels/schema"))
            .query(&[("title", cube_name), ("fields", "oid")]);
        self.authorize(request)
    }
}
