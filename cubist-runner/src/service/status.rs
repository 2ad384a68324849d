//! Status poller
//!
//! Watches a submitted build until it reaches a terminal status or the attempt
//! budget runs out.
//!
//! One counter bounds every status query, whichever path led to it:
//! - `building`, or a failed query: wait the poll interval, query again
//! - `failed`: wait the cooldown, request one rebuild, wait the settle
//!   interval, query again
//! - anything else: that is the result
//!
//! When the budget is spent the last observed status is returned as-is, which
//! may be `building`, `failed` or unknown.

use cubist_core::domain::build::{BuildHandle, BuildStatus};
use cubist_core::domain::job::BuildType;
use std::sync::Arc;
use tokio::time;
use tracing::{debug, info, warn};

use super::trigger::BuildTrigger;
use crate::config::RetryPolicy;
use crate::repository::BuildRepository;

/// Rebuilds requested from the `failed` path are always full builds
const REBUILD_TYPE: BuildType = BuildType::Full;

/// Polls build status with bounded retries
#[derive(Clone)]
pub struct StatusPoller {
    repository: Arc<dyn BuildRepository>,
    trigger: BuildTrigger,
    retry: RetryPolicy,
}

impl StatusPoller {
    pub fn new(repository: Arc<dyn BuildRepository>, trigger: BuildTrigger, retry: RetryPolicy) -> Self {
        Self {
            repository,
            trigger,
            retry,
        }
    }

    /// Polls `handle` until a terminal status or until the budget is spent
    ///
    /// Never fails: query errors count as an unknown status and rebuild errors
    /// are logged and absorbed.
    pub async fn poll(&self, handle: &BuildHandle, cube_name: &str) -> Option<BuildStatus> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let status = self.query(handle).await;
            debug!(
                "Build {} for cube {} reported {} (attempt {}/{})",
                handle,
                cube_name,
                status.as_ref().map_or("unknown", BuildStatus::as_str),
                attempt,
                max_attempts
            );

            let budget_left = attempt < max_attempts;

            match status {
                Some(BuildStatus::Failed) if budget_left => {
                    info!("Cube {} failed. Sleeping {:?}...", cube_name, self.retry.failed_cooldown);
                    time::sleep(self.retry.failed_cooldown).await;

                    info!("Attempting to rebuild cube {}...", cube_name);
                    if let Err(e) = self.trigger.rebuild(cube_name, REBUILD_TYPE).await {
                        warn!("Failed to rebuild {}: {}", cube_name, e);
                    }

                    time::sleep(self.retry.rebuild_settle).await;
                }
                Some(status) if !status.is_building() => return Some(status),
                status if !budget_left => {
                    warn!(
                        "Giving up on build {} for cube {} after {} attempts",
                        handle, cube_name, attempt
                    );
                    return status;
                }
                _ => {
                    time::sleep(self.retry.poll_interval).await;
                }
            }

            attempt += 1;
        }
    }

    /// One status query; failures and missing statuses are unknown
    async fn query(&self, handle: &BuildHandle) -> Option<BuildStatus> {
        match self.repository.build_status(handle).await {
            Ok(state) => state.status,
            Err(e) => {
                warn!("Failed to get status of build {}: {}", handle, e);
                None
            }
        }
    }
}
