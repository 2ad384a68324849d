//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single configured cube build
///
/// Jobs are read from configuration and never mutated afterwards. The field
/// names on the wire match the configuration file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Title of the cube on the analytics server
    pub cube_name: String,

    /// Kind of build to request
    #[serde(rename = "type_of_build", default)]
    pub build_type: BuildType,

    /// What to do with the rest of the run when this build does not finish
    #[serde(rename = "onFailure")]
    pub on_failure: FailurePolicy,
}

impl JobSpec {
    pub fn new(cube_name: impl Into<String>, build_type: BuildType, on_failure: FailurePolicy) -> Self {
        Self {
            cube_name: cube_name.into(),
            build_type,
            on_failure,
        }
    }
}

/// Build type understood by the analytics server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum BuildType {
    /// Rebuild every table of the cube
    #[default]
    Full,
    /// Rebuild table by table
    ByTable,
    /// Only apply schema changes
    SchemaChanges,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Full => "full",
            BuildType::ByTable => "by_table",
            BuildType::SchemaChanges => "schema_changes",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ParseJobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(BuildType::Full),
            "by_table" => Ok(BuildType::ByTable),
            "schema_changes" => Ok(BuildType::SchemaChanges),
            _ => Err(ParseJobError::BuildType(s.to_string())),
        }
    }
}

impl TryFrom<String> for BuildType {
    type Error = ParseJobError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-job failure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FailurePolicy {
    /// Stop the run when this job does not finish with `done`
    Exit,
    /// Carry on with the next job whatever happens
    Ignore,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Exit => "exit",
            FailurePolicy::Ignore => "ignore",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ParseJobError;

    /// Matching is case-insensitive (`Exit`, `EXIT` and `exit` are the same)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exit" => Ok(FailurePolicy::Exit),
            "ignore" => Ok(FailurePolicy::Ignore),
            _ => Err(ParseJobError::FailurePolicy(s.to_string())),
        }
    }
}

impl TryFrom<String> for FailurePolicy {
    type Error = ParseJobError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error returned when a job field holds an unknown value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseJobError {
    #[error("unknown build type '{0}' (expected full, by_table or schema_changes)")]
    BuildType(String),

    #[error("unknown failure policy '{0}' (expected exit or ignore)")]
    FailurePolicy(String),
}
