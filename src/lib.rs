//! datacap — embedded usage ledger with a concurrent transaction-conflict
//! harness.
//!
//! The crate demonstrates the classic lost-update anomaly and its
//! resolution against a single shared decimal usage record:
//!
//! - [`UsageStore`] owns the counter records, with per-record update-intent
//!   locks, row latches, and versioned commits
//! - [`TransactionRunner`] executes one atomic add attempt
//! - [`RetryCoordinator`] wraps a runner with bounded linear-backoff retry
//! - [`ConflictDemo`] elicits the anomaly on purpose; [`ResolutionDemo`]
//!   shows the corrected lock-and-retry path
//! - [`CustomerDirectory`] carries the browsing/editing and usage-report
//!   collaborators
//!
//! ```no_run
//! use datacap::{ConflictDemo, CounterStore, UsageStore, USAGE_RECORD_ID};
//! use rust_decimal::Decimal;
//! use std::time::Duration;
//!
//! # fn main() -> datacap::Result<()> {
//! let store = UsageStore::new();
//! store.reset(USAGE_RECORD_ID, Decimal::from(100))?;
//!
//! let demo = ConflictDemo::new(&store, USAGE_RECORD_ID, Duration::from_millis(500));
//! let report = demo.run()?;
//! if report.lost_update() {
//!     println!("lost update: expected {}, got {}", report.expected, report.final_value);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use datacap_core::{
    error::{Error, Result},
    traits::CounterStore,
    types::{
        CounterRecord, Customer, CustomerFilter, IsolationLevel, Page, PageRequest, RetryPolicy,
        Subscription, TransactionOutcome, UsageReportRow, USAGE_RECORD_ID,
    },
};
pub use datacap_harness::{
    demo::{ConflictDemo, DemoReport, ResolutionDemo, FAST_DELTA, SLOW_DELTA},
    retry::RetryCoordinator,
    runner::TransactionRunner,
};
pub use datacap_store::{CustomerDirectory, UsageStore};
