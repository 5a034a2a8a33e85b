//! End-to-End Integration Tests
//!
//! These tests drive the inbound policy pipeline and the artifact exchange
//! through the public APIs only, over in-memory storage and a fixed clock.

mod artifact_flow;
mod common;
mod policy_pipeline;
