//! Core types for the datacap usage ledger
//!
//! This crate defines the fundamental types shared across the system:
//! - [`CounterRecord`]: the shared usage record under contention
//! - [`IsolationLevel`]: caller-selected concurrency-control strength
//! - [`RetryPolicy`] and [`TransactionOutcome`]: retry harness contract
//! - [`Error`]: the unified error taxonomy with transient classification
//! - [`CounterStore`]: the store seam implemented by `datacap-store`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::CounterStore;
pub use types::{
    CounterRecord, Customer, CustomerFilter, IsolationLevel, Page, PageRequest, RetryPolicy,
    Subscription, TransactionOutcome, UsageReportRow, USAGE_RECORD_ID,
};
