//! Model resolver
//!
//! Looks up the data model id (`oid`) of a cube. Lookups are never cached: a
//! build attempt always uses an id fetched for that attempt.

use cubist_client::ClientError;
use cubist_core::domain::build::ModelId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::repository::BuildRepository;

/// Reasons a cube's model id could not be resolved
///
/// Both variants mean the same thing to callers: this job cannot proceed.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The server answered without an `oid`
    #[error("no data model found for cube '{cube_name}'")]
    NotFound { cube_name: String },

    /// The lookup request itself failed
    #[error("failed to look up data model for cube '{cube_name}'")]
    Transport {
        cube_name: String,
        #[source]
        source: ClientError,
    },
}

/// Resolves cube names to data model ids
#[derive(Clone)]
pub struct ModelResolver {
    repository: Arc<dyn BuildRepository>,
}

impl ModelResolver {
    pub fn new(repository: Arc<dyn BuildRepository>) -> Self {
        Self { repository }
    }

    /// Issues a single schema lookup for `cube_name`
    pub async fn resolve(&self, cube_name: &str) -> Result<ModelId, ResolveError> {
        match self.repository.lookup_model(cube_name).await {
            Ok(Some(model_id)) => {
                debug!("Resolved cube {} to data model {}", cube_name, model_id);
                Ok(model_id)
            }
            Ok(None) => {
                error!("Failed to get oid for {}. Please check schema", cube_name);
                Err(ResolveError::NotFound {
                    cube_name: cube_name.to_string(),
                })
            }
            Err(e) => {
                error!("Failed to get oid for {}: {}", cube_name, e);
                Err(ResolveError::Transport {
                    cube_name: cube_name.to_string(),
                    source: e,
                })
            }
        }
    }
}
