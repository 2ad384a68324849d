//! Run report types
//!
//! A run processes the configured job list once. Its report is the ordered list
//! of per-job outcomes plus the job that stopped the run early, if any.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::build::BuildStatus;
use super::job::{BuildType, FailurePolicy, JobSpec};

/// Outcome of one processed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub cube_name: String,
    pub build_type: BuildType,
    pub on_failure: FailurePolicy,

    /// Last status observed for the build; `None` when it was never known
    pub status: Option<BuildStatus>,
}

impl JobOutcome {
    pub fn new(job: &JobSpec, status: Option<BuildStatus>) -> Self {
        Self {
            cube_name: job.cube_name.clone(),
            build_type: job.build_type,
            on_failure: job.on_failure,
            status,
        }
    }

    /// Returns `true` when the build ended in `done`
    pub fn succeeded(&self) -> bool {
        self.status.as_ref().is_some_and(BuildStatus::is_success)
    }

    /// Returns `true` when this outcome should stop the run
    ///
    /// A known, non-`done` status under the `exit` policy stops the run. An
    /// unknown status never does.
    pub fn halts_run(&self) -> bool {
        self.on_failure == FailurePolicy::Exit
            && self.status.as_ref().is_some_and(|s| !s.is_success())
    }
}

/// Report of one pass over the job list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Outcomes in the order the jobs were processed
    pub outcomes: Vec<JobOutcome>,

    /// Cube whose failure stopped the run
    pub halted_by: Option<String>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
            halted_by: None,
        }
    }

    pub fn record(&mut self, outcome: JobOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn halt(&mut self, cube_name: impl Into<String>) {
        self.halted_by = Some(cube_name.into());
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn is_halted(&self) -> bool {
        self.halted_by.is_some()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }
}
