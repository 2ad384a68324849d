//! Scripted in-memory repository for service and scheduler tests

use async_trait::async_trait;
use cubist_client::{ClientError, Result};
use cubist_core::domain::build::{BuildHandle, BuildStatus, ModelId};
use cubist_core::dto::build::{BuildCreated, BuildState, CreateBuild};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use super::BuildRepository;

/// A call observed by the repository, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup(String),
    Submit(CreateBuild),
    Status(BuildHandle),
}

/// Scripted reply to a build submission
#[derive(Debug, Clone)]
pub enum SubmitReply {
    Created(String),
    MissingOid,
    HttpError(u16),
}

/// Scripted reply to a status query
#[derive(Debug, Clone)]
pub enum StatusReply {
    Status(&'static str),
    MissingStatus,
    HttpError(u16),
}

/// Repository whose answers are scripted up front
///
/// - Lookups answer from the registered models; an unregistered cube has no
///   `oid`, and cubes marked unreachable fail at the transport level.
/// - Submissions pop scripted replies, then create `build-N` handles.
/// - Status queries pop scripted replies, then report `done`.
#[derive(Default)]
pub struct ScriptedRepository {
    models: HashMap<String, ModelId>,
    unreachable: HashSet<String>,
    submissions: Mutex<VecDeque<SubmitReply>>,
    statuses: Mutex<VecDeque<StatusReply>>,
    calls: Mutex<Vec<Call>>,
    next_build: Mutex<u32>,
}

impl ScriptedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, cube_name: &str, model_id: &str) -> Self {
        self.models.insert(cube_name.to_string(), ModelId::new(model_id));
        self
    }

    pub fn with_unreachable(mut self, cube_name: &str) -> Self {
        self.unreachable.insert(cube_name.to_string());
        self
    }

    pub fn with_submissions(self, replies: impl IntoIterator<Item = SubmitReply>) -> Self {
        self.submissions.lock().unwrap().extend(replies);
        self
    }

    pub fn with_statuses(self, replies: impl IntoIterator<Item = StatusReply>) -> Self {
        self.statuses.lock().unwrap().extend(replies);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        self.count(|c| matches!(c, Call::Lookup(_)))
    }

    pub fn submissions(&self) -> usize {
        self.count(|c| matches!(c, Call::Submit(_)))
    }

    pub fn status_queries(&self) -> usize {
        self.count(|c| matches!(c, Call::Status(_)))
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BuildRepository for ScriptedRepository {
    async fn lookup_model(&self, cube_name: &str) -> Result<Option<ModelId>> {
        self.record(Call::Lookup(cube_name.to_string()));

        if self.unreachable.contains(cube_name) {
            return Err(ClientError::api_error(503, "service unavailable"));
        }
        Ok(self.models.get(cube_name).cloned())
    }

    async fn submit_build(&self, request: &CreateBuild) -> Result<BuildCreated> {
        self.record(Call::Submit(request.clone()));

        let reply = self.submissions.lock().unwrap().pop_front();
        match reply {
            Some(SubmitReply::Created(oid)) => Ok(BuildCreated { oid: Some(oid) }),
            Some(SubmitReply::MissingOid) => Ok(BuildCreated { oid: None }),
            Some(SubmitReply::HttpError(status)) => Err(ClientError::api_error(status, "rejected")),
            None => {
                let mut next = self.next_build.lock().unwrap();
                *next += 1;
                Ok(BuildCreated {
                    oid: Some(format!("build-{}", *next)),
                })
            }
        }
    }

    async fn build_status(&self, handle: &BuildHandle) -> Result<BuildState> {
        self.record(Call::Status(handle.clone()));

        let reply = self.statuses.lock().unwrap().pop_front();
        match reply {
            Some(StatusReply::Status(status)) => Ok(BuildState {
                status: Some(BuildStatus::from(status)),
            }),
            Some(StatusReply::MissingStatus) => Ok(BuildState { status: None }),
            Some(StatusReply::HttpError(status)) => Err(ClientError::api_error(status, "unavailable")),
            None => Ok(BuildState {
                status: Some(BuildStatus::Done),
            }),
        }
    }
}
