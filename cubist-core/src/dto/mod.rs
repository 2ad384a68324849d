//! Data Transfer Objects for the analytics server REST API
//!
//! Request and response bodies exactly as they appear on the wire. Response
//! fields the runner depends on are optional so a malformed body can be told
//! apart from a failed request.

pub mod auth;
pub mod build;
pub mod datamodel;
