//! Service layer
//!
//! Services hold the build orchestration logic. Each one talks to the
//! analytics server only through a `BuildRepository` and reports back through
//! return values:
//! - Model resolver: cube name to data model id
//! - Build trigger: multi-attempt build submission and the single-shot rebuild
//! - Status poller: bounded status polling with rebuild-on-failure

mod resolver;
mod status;
mod trigger;

pub use status::StatusPoller;
pub use trigger::{BuildTrigger, SubmitError};
