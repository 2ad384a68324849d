//! Build DTOs

use serde::{Deserialize, Serialize};

use crate::domain::build::{BuildHandle, BuildStatus, ModelId};
use crate::domain::job::BuildType;

/// Request body of `POST /api/v2/builds`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuild {
    pub datamodel_id: ModelId,
    pub build_type: BuildType,
    pub row_limit: u64,
}

impl CreateBuild {
    /// A build of the whole model with no row limit
    pub fn new(datamodel_id: ModelId, build_type: BuildType) -> Self {
        Self {
            datamodel_id,
            build_type,
            row_limit: 0,
        }
    }
}

/// Response of `POST /api/v2/builds`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildCreated {
    pub oid: Option<String>,
}

impl BuildCreated {
    pub fn handle(self) -> Option<BuildHandle> {
        self.oid.filter(|oid| !oid.is_empty()).map(BuildHandle::new)
    }
}

/// Response of `GET /api/v2/builds/{oid}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildState {
    pub status: Option<BuildStatus>,
}
