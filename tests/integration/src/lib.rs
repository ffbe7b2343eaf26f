//! Integration test utilities for the matching service
//!
//! This crate provides helpers for running end-to-end scenarios against
//! the service layer, wired either to the in-memory stores or to PostgreSQL.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
