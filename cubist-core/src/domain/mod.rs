//! Core domain types
//!
//! These types describe a configured cube build job and everything produced
//! while processing it. They are shared between the HTTP client (which speaks
//! the analytics server's wire format) and the runner (which drives builds).

pub mod build;
pub mod job;
pub mod run;
