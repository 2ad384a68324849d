//! Repository layer
//!
//! Repositories are thin wrappers over the analytics server client. They give
//! the services a narrow, trait-based view of the three build endpoints so the
//! orchestration logic can be exercised without a server.

mod builds;
#[cfg(test)]
pub mod testing;

pub use builds::{BuildRepository, HttpBuildRepository};
