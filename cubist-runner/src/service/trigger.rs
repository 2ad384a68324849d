//! Build trigger
//!
//! Submits builds for a cube. The two operations here retry differently:
//! - [`BuildTrigger::submit`] retries a failed submission up to the attempt
//!   ceiling, re-resolving the model id on every attempt.
//! - [`BuildTrigger::rebuild`] issues exactly one submission and never loops.

use cubist_client::ClientError;
use cubist_core::domain::build::BuildHandle;
use cubist_core::domain::job::BuildType;
use cubist_core::dto::build::CreateBuild;
use std::sync::Arc;
use thiserror::Error;
use tokio::time;
use tracing::{error, info, warn};

use super::resolver::{ModelResolver, ResolveError};
use crate::config::RetryPolicy;
use crate::repository::BuildRepository;

/// Why a single submission attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The request failed or the server rejected it
    #[error(transparent)]
    Request(#[from] ClientError),

    /// The server accepted the request but returned no build `oid`
    #[error("build response did not contain an oid")]
    MissingHandle,
}

/// Fatal submission failures; either one ends the whole run
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The cube's model id could not be resolved, so nothing was submitted
    #[error("could not resolve data model for cube '{cube_name}'")]
    NoDataModel {
        cube_name: String,
        #[source]
        source: ResolveError,
    },

    /// Every submission attempt failed
    #[error("failed to build cube '{cube_name}' after {attempts} attempts")]
    AttemptsExhausted {
        cube_name: String,
        attempts: u32,
        #[source]
        last_error: AttemptError,
    },
}

/// Why a single-shot rebuild did not go through
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("rebuild request failed: {0}")]
    Rejected(#[from] ClientError),
}

/// Submits cube builds
#[derive(Clone)]
pub struct BuildTrigger {
    resolver: ModelResolver,
    repository: Arc<dyn BuildRepository>,
    retry: RetryPolicy,
}

impl BuildTrigger {
    pub fn new(repository: Arc<dyn BuildRepository>, retry: RetryPolicy) -> Self {
        Self {
            resolver: ModelResolver::new(Arc::clone(&repository)),
            repository,
            retry,
        }
    }

    /// Submits a build, retrying failed submissions
    ///
    /// Each attempt resolves the model id afresh. A failed resolution ends the
    /// submission at once without posting anything; a failed post waits for
    /// the submit backoff and tries again until the attempt ceiling is reached.
    pub async fn submit(
        &self,
        cube_name: &str,
        build_type: BuildType,
    ) -> Result<BuildHandle, SubmitError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let model_id = match self.resolver.resolve(cube_name).await {
                Ok(model_id) => model_id,
                Err(e) => {
                    error!("No datamodel found for {}.", cube_name);
                    return Err(SubmitError::NoDataModel {
                        cube_name: cube_name.to_string(),
                        source: e,
                    });
                }
            };

            info!(
                "Attempting build for cube: {} (attempt {}/{})...",
                cube_name, attempt, max_attempts
            );

            let request = CreateBuild::new(model_id, build_type);
            let last_error = match self.post(&request).await {
                Ok(handle) => {
                    info!("Cube {} submitted as build {}", cube_name, handle);
                    return Ok(handle);
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                error!(
                    "Failed to build {}. Max attempts reached. Please check schema",
                    cube_name
                );
                return Err(SubmitError::AttemptsExhausted {
                    cube_name: cube_name.to_string(),
                    attempts: attempt,
                    last_error,
                });
            }

            warn!(
                "Failed to submit build for {} (attempt {}/{}): {}",
                cube_name, attempt, max_attempts, last_error
            );
            warn!("Retrying in {:?}...", self.retry.submit_backoff);

            time::sleep(self.retry.submit_backoff).await;
            attempt += 1;
        }
    }

    /// Requests one rebuild of a cube
    ///
    /// Resolves the model id and posts a single build request. The response
    /// body is ignored, so an accepted request without an `oid` still counts;
    /// callers keep watching the build they already have.
    pub async fn rebuild(&self, cube_name: &str, build_type: BuildType) -> Result<(), RebuildError> {
        let model_id = self.resolver.resolve(cube_name).await?;

        info!("Attempting to rebuild {}...", cube_name);

        self.repository
            .submit_build(&CreateBuild::new(model_id, build_type))
            .await?;
        Ok(())
    }

    async fn post(&self, request: &CreateBuild) -> Result<BuildHandle, AttemptError> {
        let created = self.repository.submit_build(request).await?;
        created.handle().ok_or(AttemptError::MissingHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{Call, ScriptedRepository, SubmitReply};
    use cubist_core::domain::build::ModelId;
    use std::time::Duration;
    use tokio::time::Instant;

    fn trigger(repo: &Arc<ScriptedRepository>) -> BuildTrigger {
        BuildTrigger::new(repo.clone(), RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_succeeds() {
        let repo = Arc::new(
            ScriptedRepository::new()
                .with_model("Sales", "m-1")
                .with_submissions([SubmitReply::Created("b-1".to_string())]),
        );

        let handle = trigger(&repo).submit("Sales", BuildType::Full).await.unwrap();

        assert_eq!(handle, BuildHandle::new("b-1"));
        assert_eq!(
            repo.calls(),
            vec![
                Call::Lookup("Sales".to_string()),
                Call::Submit(CreateBuild {
                    datamodel_id: ModelId::new("m-1"),
                    build_type: BuildType::Full,
                    row_limit: 0,
                }),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_model_never_posts() {
        let repo = Arc::new(ScriptedRepository::new());

        let err = trigger(&repo).submit("Sales", BuildType::Full).await.unwrap_err();

        assert!(matches!(err, SubmitError::NoDataModel { ref cube_name, .. } if cube_name == "Sales"));
        assert_eq!(repo.lookups(), 1);
        assert_eq!(repo.submissions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_transport_failure_is_fatal_without_retry() {
        let repo = Arc::new(ScriptedRepository::new().with_unreachable("Sales"));

        let err = trigger(&repo).submit("Sales", BuildType::Full).await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::NoDataModel {
                source: ResolveError::Transport { .. },
                ..
            }
        ));
        assert_eq!(repo.submissions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_with_backoff_and_fresh_lookup() {
        let repo = Arc::new(
            ScriptedRepository::new()
                .with_model("Sales", "m-1")
                .with_submissions([
                    SubmitReply::HttpError(500),
                    SubmitReply::MissingOid,
                    SubmitReply::Created("b-3".to_string()),
                ]),
        );

        let started = Instant::now();
        let handle = trigger(&repo).submit("Sales", BuildType::ByTable).await.unwrap();

        assert_eq!(handle, BuildHandle::new("b-3"));
        assert_eq!(repo.lookups(), 3);
        assert_eq!(repo.submissions(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_four_attempts() {
        let repo = Arc::new(
            ScriptedRepository::new()
                .with_model("Sales", "m-1")
                .with_submissions(std::iter::repeat_n(SubmitReply::HttpError(503), 10)),
        );

        let started = Instant::now();
        let err = trigger(&repo).submit("Sales", BuildType::Full).await.unwrap_err();

        match err {
            SubmitError::AttemptsExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 4);
                assert!(matches!(last_error, AttemptError::Request(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.submissions(), 4);
        assert_eq!(repo.lookups(), 4);
        // three waits between four attempts
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_posts_exactly_once() {
        let repo = Arc::new(
            ScriptedRepository::new()
                .with_model("Sales", "m-1")
                .with_submissions([SubmitReply::HttpError(500)]),
        );

        let started = Instant::now();
        let result = trigger(&repo).rebuild("Sales", BuildType::Full).await;

        assert!(matches!(result, Err(RebuildError::Rejected(_))));
        assert_eq!(repo.submissions(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_without_model_posts_nothing() {
        let repo = Arc::new(ScriptedRepository::new());

        let result = trigger(&repo).rebuild("Sales", BuildType::Full).await;

        assert!(matches!(result, Err(RebuildError::Resolve(_))));
        assert_eq!(repo.submissions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_ignores_missing_oid() {
        let repo = Arc::new(
            ScriptedRepository::new()
                .with_model("Sales", "m-1")
                .with_submissions([SubmitReply::MissingOid]),
        );

        let result = trigger(&repo).rebuild("Sales", BuildType::Full).await;

        assert!(result.is_ok());
        assert_eq!(repo.submissions(), 1);
    }
}
