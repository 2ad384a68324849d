//! Scheduler layer for the runner
//!
//! This layer drives the configured job list: the orchestrator processes each
//! job in order, and the run schedule decides when the next pass starts in
//! recurring mode.

pub mod orchestrator;
pub mod schedule;

pub use orchestrator::JobOrchestrator;
pub use schedule::RunSchedule;
