//! Transaction-conflict harness for datacap
//!
//! This crate runs competing add transactions against a shared counter
//! record:
//! - [`TransactionRunner`]: exactly one attempt, outcome-reporting
//! - [`RetryCoordinator`]: bounded retry with linear backoff around a runner
//! - [`ConflictDemo`]: elicits the lost-update anomaly on purpose
//! - [`ResolutionDemo`]: the corrected, lock-and-retry path

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod demo;
pub mod retry;
pub mod runner;

#[cfg(test)]
mod testutil;

pub use demo::{ConflictDemo, DemoReport, ResolutionDemo};
pub use retry::RetryCoordinator;
pub use runner::TransactionRunner;
