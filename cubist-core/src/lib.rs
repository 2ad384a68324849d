//! Cubist Core
//!
//! Core types shared by the Cubist cube build orchestrator.
//!
//! This crate contains:
//! - Domain types: jobs, build identifiers, build statuses and run reports
//! - DTOs: request and response bodies of the analytics server REST API

pub mod domain;
pub mod dto;
