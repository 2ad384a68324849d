//! Runner configuration
//!
//! Defines the deployment to talk to, how to authenticate, the ordered job
//! list, an optional cron schedule, and the retry/backoff timings used while
//! submitting and polling builds.
//!
//! Settings come from a JSON file and can be overridden from the environment.

use anyhow::{Context, Result};
use cubist_core::domain::job::JobSpec;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::scheduler::RunSchedule;

/// Runner configuration
///
/// Built once at startup and passed by reference to everything that needs it;
/// never mutated while jobs are processed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment host or base URL (e.g., "analytics.example.com")
    pub server: String,

    /// How requests are authorized
    pub credentials: Credentials,

    /// Jobs to process, in order
    pub jobs: Vec<JobSpec>,

    /// Cron expression for recurring runs; `None` runs the job list once
    pub schedule: Option<String>,

    /// Retry ceilings and backoff waits
    pub retry: RetryPolicy,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
}

/// Source of the `authorization` header value
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Header value used verbatim
    Token(String),
    /// Log in at startup to obtain a bearer token
    Login { username: String, password: String },
    /// Nothing configured
    Missing,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => write!(f, "Token(****)"),
            Credentials::Login { username, .. } => write!(f, "Login({})", username),
            Credentials::Missing => write!(f, "Missing"),
        }
    }
}

/// Retry ceilings and waits for build submission and status polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Ceiling shared by submission attempts and by status queries
    pub max_attempts: u32,

    /// Wait between failed build submissions
    pub submit_backoff: Duration,

    /// Wait between status queries while a build is running
    pub poll_interval: Duration,

    /// Wait after a build reports `failed`, before the rebuild
    pub failed_cooldown: Duration,

    /// Wait after the rebuild, before polling again
    pub rebuild_settle: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            submit_backoff: Duration::from_secs(15),
            poll_interval: Duration::from_secs(15),
            failed_cooldown: Duration::from_secs(120),
            rebuild_settle: Duration::from_secs(20),
        }
    }
}

/// On-disk layout of the configuration file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: String,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    #[serde(default)]
    jobs: Vec<JobSpec>,
    schedule: Option<String>,
    #[serde(default)]
    retry: RetrySettings,
    request_timeout_secs: Option<u64>,
}

/// Retry timings as written in the configuration file, in seconds
#[derive(Debug, Default, Deserialize)]
struct RetrySettings {
    max_attempts: Option<u32>,
    submit_backoff_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    failed_cooldown_secs: Option<u64>,
    rebuild_settle_secs: Option<u64>,
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_attempts: settings.max_attempts.unwrap_or(defaults.max_attempts),
            submit_backoff: settings
                .submit_backoff_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.submit_backoff),
            poll_interval: settings
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            failed_cooldown: settings
                .failed_cooldown_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.failed_cooldown),
            rebuild_settle: settings
                .rebuild_settle_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.rebuild_settle),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to load config file: {}", path.display()))?;

        Self::from_json(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parses configuration from a JSON document
    ///
    /// Expected shape:
    /// ```json
    /// {
    ///   "server": "analytics.example.com",
    ///   "token": "Bearer ...",
    ///   "schedule": "*/30 * * * *",
    ///   "jobs": [
    ///     {"cube_name": "Sample Ecommerce", "type_of_build": "full", "onFailure": "exit"}
    ///   ]
    /// }
    /// ```
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: FileConfig =
            serde_json::from_str(contents).context("Failed to parse configuration JSON")?;

        let credentials = match (file.token, file.username, file.password) {
            (Some(token), _, _) if !token.trim().is_empty() => Credentials::Token(token),
            (_, Some(username), Some(password)) => Credentials::Login { username, password },
            _ => Credentials::Missing,
        };

        Ok(Self {
            server: file.server,
            credentials,
            jobs: file.jobs,
            schedule: file.schedule.filter(|s| !s.trim().is_empty()),
            retry: file.retry.into(),
            request_timeout: Duration::from_secs(file.request_timeout_secs.unwrap_or(30)),
        })
    }

    /// Applies environment variable overrides
    ///
    /// Recognized environment variables:
    /// - CUBIST_SERVER
    /// - CUBIST_TOKEN (takes precedence over any configured login)
    /// - CUBIST_USERNAME / CUBIST_PASSWORD (both required to switch to login)
    /// - CUBIST_SCHEDULE
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable source
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(server) = get("CUBIST_SERVER") {
            self.server = server;
        }

        if let Some(token) = get("CUBIST_TOKEN") {
            self.credentials = Credentials::Token(token);
        } else if let (Some(username), Some(password)) =
            (get("CUBIST_USERNAME"), get("CUBIST_PASSWORD"))
        {
            self.credentials = Credentials::Login { username, password };
        }

        if let Some(schedule) = get("CUBIST_SCHEDULE") {
            self.schedule = Some(schedule);
        }

        self
    }

    /// Parses the configured schedule, if any
    pub fn run_schedule(&self) -> Result<Option<RunSchedule>> {
        self.schedule
            .as_deref()
            .map(|expr| RunSchedule::parse(expr).with_context(|| format!("Invalid schedule '{}'", expr)))
            .transpose()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            anyhow::bail!("server cannot be empty");
        }

        if self.credentials == Credentials::Missing {
            anyhow::bail!("either token or username and password must be set");
        }

        if self.jobs.is_empty() {
            anyhow::bail!("jobs cannot be empty");
        }

        if let Some(index) = self.jobs.iter().position(|j| j.cube_name.trim().is_empty()) {
            anyhow::bail!("job {} has an empty cube_name", index + 1);
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be greater than 0");
        }

        if self.request_timeout.as_secs() == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        self.run_schedule()?;

        Ok(())
    }
}
