//! Data model DTOs

use serde::{Deserialize, Serialize};

use crate::domain::build::ModelId;

/// Response of `GET /api/v2/datamodels/schema?title=..&fields=oid`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaLookup {
    pub oid: Option<String>,
}

impl SchemaLookup {
    /// The model id, if the server returned a non-empty one
    pub fn model_id(self) -> Option<ModelId> {
        self.oid.filter(|oid| !oid.is_empty()).map(ModelId::new)
    }
}
