//! `assist-runner` library crate.
//!
//! Exposes the [`workflow`] module for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod workflow;

pub use workflow::{RunReport, SubmitOutcome, Workflow};
