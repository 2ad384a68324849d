//! Build domain types
//!
//! Identifiers handed out by the analytics server and the status a build
//! reports while it runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier (`oid`) of a cube's data model
///
/// Looked up fresh for every build attempt and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier (`oid`) of one submitted build, used to poll its status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildHandle(String);

impl BuildHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by the server for a build
///
/// Only `building`, `done` and `failed` drive decisions. Any other value is
/// kept verbatim so it can be logged and reported as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    /// Build is still running
    Building,
    /// Build finished successfully
    Done,
    /// Build finished with an error
    Failed,
    /// Any other value the server reports
    Other(String),
}

impl BuildStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::Building => "building",
            BuildStatus::Done => "done",
            BuildStatus::Failed => "failed",
            BuildStatus::Other(s) => s,
        }
    }

    /// Returns `true` for the single success value
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Done)
    }

    /// Returns `true` while the server is still working on the build
    pub fn is_building(&self) -> bool {
        matches!(self, BuildStatus::Building)
    }
}

impl From<String> for BuildStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "building" => BuildStatus::Building,
            "done" => BuildStatus::Done,
            "failed" => BuildStatus::Failed,
            _ => BuildStatus::Other(value),
        }
    }
}

impl From<&str> for BuildStatus {
    fn from(value: &str) -> Self {
        BuildStatus::from(value.to_string())
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        match status {
            BuildStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
