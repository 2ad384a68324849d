//! Job orchestrator
//!
//! Processes the configured job list strictly in order, one job at a time:
//! submit the build, poll it to a terminal or give-up status, log the outcome,
//! then apply the job's failure policy.
//!
//! A submission failure ends the run at once whatever the job's policy. A
//! build that ends in a known non-`done` status stops the run only when the
//! job's policy is `exit`.

use chrono::Utc;
use cubist_core::domain::job::JobSpec;
use cubist_core::domain::run::{JobOutcome, RunReport};
use std::sync::Arc;
use thiserror::Error;
use tokio::time;
use tracing::{error, info, warn};

use super::schedule::RunSchedule;
use crate::config::RetryPolicy;
use crate::repository::BuildRepository;
use crate::service::{BuildTrigger, StatusPoller, SubmitError};

/// Errors that end a run before the job list is finished
#[derive(Debug, Error)]
pub enum RunError {
    /// A build could not be submitted; no later job is attempted
    #[error(transparent)]
    Submission(#[from] SubmitError),
}

/// Drives the job list through submission, polling and failure policy
pub struct JobOrchestrator {
    trigger: BuildTrigger,
    poller: StatusPoller,
}

impl JobOrchestrator {
    /// Creates a new orchestrator
    pub fn new(repository: Arc<dyn BuildRepository>, retry: RetryPolicy) -> Self {
        let trigger = BuildTrigger::new(Arc::clone(&repository), retry);
        let poller = StatusPoller::new(repository, trigger.clone(), retry);
        Self { trigger, poller }
    }

    /// Processes every job once, in order
    ///
    /// # Returns
    /// The report of the pass, or the submission error that ended it
    pub async fn run(&self, jobs: &[JobSpec]) -> Result<RunReport, RunError> {
        info!("Starting run of {} job(s)", jobs.len());

        let mut report = RunReport::start();

        for job in jobs {
            let outcome = self.process_job(job).await?;
            let halts = outcome.halts_run();
            report.record(outcome);

            if halts {
                info!(
                    "Process stopped due to cube {} failed to build",
                    job.cube_name
                );
                report.halt(job.cube_name.clone());
                break;
            }
        }

        let report = report.finish();
        info!(
            "Run finished: {}/{} job(s) built successfully",
            report.succeeded_count(),
            report.outcomes.len()
        );

        Ok(report)
    }

    /// Submits and polls a single job
    async fn process_job(&self, job: &JobSpec) -> Result<JobOutcome, SubmitError> {
        info!("Cube {} is building...", job.cube_name);

        let handle = self
            .trigger
            .submit(&job.cube_name, job.build_type)
            .await
            .inspect_err(|e| error!("Stopping run: {}", e))?;

        let status = self.poller.poll(&handle, &job.cube_name).await;

        match &status {
            Some(status) if status.is_success() => {
                info!("Cube {} built with status {}", job.cube_name, status)
            }
            Some(status) => warn!("Cube {} built with status {}", job.cube_name, status),
            None => warn!("Cube {} finished with unknown status", job.cube_name),
        }

        Ok(JobOutcome::new(job, status))
    }

    /// Runs the job list on every tick of `schedule`
    ///
    /// A run stopped by a job's failure policy only ends that pass; the next
    /// tick starts a fresh one. A submission failure ends the loop.
    pub async fn run_scheduled(&self, jobs: &[JobSpec], schedule: &RunSchedule) -> Result<(), RunError> {
        info!("Scheduling runs with '{}'", schedule.expression());

        loop {
            let now = Utc::now();
            let (Some(next), Some(delay)) = (schedule.next_after(now), schedule.delay_from(now)) else {
                info!("Schedule '{}' has no upcoming runs", schedule.expression());
                return Ok(());
            };

            info!("Next run at {}", next.format("%Y-%m-%d %H:%M:%S"));
            time::sleep(delay).await;

            let report = self.run(jobs).await?;
            if let Some(cube_name) = &report.halted_by {
                warn!("Run stopped early by cube {}; waiting for next run", cube_name);
            }
        }
    }
}
