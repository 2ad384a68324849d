//! Cubist Runner
//!
//! Rebuilds analytic cubes on an analytics server, one configured job at a
//! time.
//!
//! Architecture:
//! - Configuration: JSON file with environment overrides
//! - Repositories: HTTP communication with the analytics server
//! - Services: model resolution, build submission, status polling
//! - Scheduler: job orchestration and the recurring run loop
//!
//! Exit status is non-zero when a build cannot be submitted, or when a job
//! with the `exit` failure policy does not finish with `done`.

mod config;
mod repository;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Credentials};
use crate::repository::HttpBuildRepository;
use crate::scheduler::JobOrchestrator;
use cubist_client::AnalyticsClient;
use cubist_core::domain::run::RunReport;

/// Exit status of a run stopped by a job's `exit` failure policy
const HALTED_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "cubist")]
#[command(about = "Scheduled cube rebuilds for an analytics server", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "CUBIST_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Run the job list once, ignoring any configured schedule
    #[arg(long)]
    once: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cubist=info,cubist_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    info!(
        "Loaded configuration: server={}, jobs={}, credentials={:?}",
        config.server,
        config.jobs.len(),
        config.credentials
    );

    if cli.check {
        info!("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    let client = connect(&config).await?;
    let repository = Arc::new(HttpBuildRepository::new(client));
    let orchestrator = JobOrchestrator::new(repository, config.retry);

    let schedule = if cli.once { None } else { config.run_schedule()? };

    if let Some(schedule) = schedule {
        orchestrator
            .run_scheduled(&config.jobs, &schedule)
            .await
            .context("Scheduled run aborted")?;
        return Ok(ExitCode::SUCCESS);
    }

    let report = orchestrator.run(&config.jobs).await.context("Run aborted")?;

    Ok(exit_code(&report))
}

/// Maps a finished one-shot run to the process exit status
///
/// A run that ended in error never gets here; `main` returns the error and
/// the process exits with 1.
fn exit_code(report: &RunReport) -> ExitCode {
    if let Some(cube_name) = &report.halted_by {
        error!("Run stopped by cube {}", cube_name);
    }
    ExitCode::from(exit_status(report))
}

fn exit_status(report: &RunReport) -> u8 {
    if report.is_halted() { HALTED_EXIT_CODE } else { 0 }
}

/// Loads and validates configuration from the file and environment
fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::from_file(&cli.config)?.with_env_overrides();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Builds an authorized client, logging in first when no token is configured
async fn connect(config: &Config) -> Result<AnalyticsClient> {
    let client = AnalyticsClient::with_timeout(&config.server, config.request_timeout)
        .context("Failed to create HTTP client")?;

    let token = match &config.credentials {
        Credentials::Token(token) => token.clone(),
        Credentials::Login { username, password } => {
            info!("Logging in to {} as {}", client.base_url(), username);
            client
                .login(username, password)
                .await
                .context("Failed to obtain access token")?
        }
        Credentials::Missing => anyhow::bail!("No credentials configured"),
    };

    info!("Analytics client initialized for {}", client.base_url());

    Ok(client.with_token(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubist_core::domain::build::BuildStatus;
    use cubist_core::domain::job::{BuildType, FailurePolicy, JobSpec};
    use cubist_core::domain::run::JobOutcome;

    fn outcome(cube_name: &str, on_failure: FailurePolicy, status: &str) -> JobOutcome {
        let job = JobSpec::new(cube_name, BuildType::Full, on_failure);
        JobOutcome::new(&job, Some(BuildStatus::from(status)))
    }

    #[test]
    fn test_completed_run_exits_zero() {
        let mut report = RunReport::start();
        report.record(outcome("Sales", FailurePolicy::Exit, "done"));
        report.record(outcome("Inventory", FailurePolicy::Ignore, "failed"));

        assert_eq!(exit_status(&report.finish()), 0);
    }

    #[test]
    fn test_halted_run_exits_with_halted_code() {
        let mut report = RunReport::start();
        report.record(outcome("Sales", FailurePolicy::Exit, "failed"));
        report.halt("Sales".to_string());

        assert_eq!(exit_status(&report.finish()), HALTED_EXIT_CODE);
    }

    #[test]
    fn test_empty_run_exits_zero() {
        assert_eq!(exit_status(&RunReport::start().finish()), 0);
    }
}
