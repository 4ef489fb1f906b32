//! The two demo orchestrators: anomaly elicitation and its resolution.
//!
//! Both demos move through the same phases: read the initial value, launch
//! two add transactions on concurrently running threads, await both, read
//! the final value, classify. The concurrency is the feature under test, so
//! the two sides are always launched together, never sequentially, and no
//! ordering is assumed between them.

use rust_decimal::Decimal;
use std::thread;
use std::time::Duration;

use datacap_core::error::{Error, Result};
use datacap_core::traits::CounterStore;
use datacap_core::types::{IsolationLevel, RetryPolicy, TransactionOutcome};

use crate::retry::RetryCoordinator;
use crate::runner::TransactionRunner;

/// Delta applied by the delayed (slow) transaction.
pub const SLOW_DELTA: u32 = 50;
/// Delta applied by the undelayed (fast) transaction.
pub const FAST_DELTA: u32 = 30;

/// Comparison tolerance for decimal classification.
fn tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// What a demo run observed.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    /// Value read before launching the transactions
    pub initial: Decimal,
    /// `initial + SLOW_DELTA + FAST_DELTA`
    pub expected: Decimal,
    /// Value read after both sides finished
    pub final_value: Decimal,
    /// Per-transaction outcomes, slow side first
    pub outcomes: [TransactionOutcome; 2],
}

impl DemoReport {
    /// Both updates landed: the final value matches the expectation.
    pub fn consistent(&self) -> bool {
        (self.final_value - self.expected).abs() < tolerance()
    }

    /// A lost update: the final value fell short of the expectation.
    pub fn lost_update(&self) -> bool {
        self.final_value < self.expected - tolerance()
    }
}

/// Orchestrates two concurrent unprotected add transactions to elicit the
/// lost-update anomaly.
///
/// The slow side adds 50 with an artificial delay between its read and its
/// write; the fast side adds 30 with no delay. Both run at the weakest
/// isolation level — the store's documented default — so the slow side's
/// write can silently overwrite the fast side's committed update.
pub struct ConflictDemo<'a, S: CounterStore + ?Sized> {
    store: &'a S,
    record_id: u32,
    race_window: Duration,
}

impl<'a, S: CounterStore + ?Sized> ConflictDemo<'a, S> {
    /// Create a demo against one record with the given race window.
    pub fn new(store: &'a S, record_id: u32, race_window: Duration) -> Self {
        ConflictDemo {
            store,
            record_id,
            race_window,
        }
    }

    /// Run the demo to completion and report what happened.
    pub fn run(&self) -> Result<DemoReport> {
        let initial = self.store.read(self.record_id)?;
        tracing::info!(
            record_id = self.record_id,
            initial = %initial,
            window_ms = self.race_window.as_millis() as u64,
            "running unprotected conflict demo"
        );

        let slow_runner = TransactionRunner::new(self.store, self.record_id, "slow-add-50");
        let fast_runner = TransactionRunner::new(self.store, self.record_id, "fast-add-30");
        let isolation = IsolationLevel::default();

        let (slow, fast) = run_both(
            move || slow_runner.run(Decimal::from(SLOW_DELTA), isolation, self.race_window),
            move || fast_runner.run(Decimal::from(FAST_DELTA), isolation, Duration::ZERO),
        )?;

        let final_value = self.store.read(self.record_id)?;
        Ok(DemoReport {
            initial,
            expected: initial + Decimal::from(SLOW_DELTA + FAST_DELTA),
            final_value,
            outcomes: [slow, fast],
        })
    }
}

/// Orchestrates the corrected path: two concurrent add transactions, each
/// wrapped in [`RetryCoordinator`], at a caller-chosen isolation level.
///
/// The two sides yield independent outcomes — one may succeed while the
/// other exhausts its retries, and the report surfaces both rather than
/// masking the failure.
pub struct ResolutionDemo<'a, S: CounterStore + ?Sized> {
    store: &'a S,
    record_id: u32,
    isolation: IsolationLevel,
    policy: RetryPolicy,
}

impl<'a, S: CounterStore + ?Sized> ResolutionDemo<'a, S> {
    /// Create a demo against one record with the caller's isolation level
    /// and retry policy (shared by both sides).
    pub fn new(
        store: &'a S,
        record_id: u32,
        isolation: IsolationLevel,
        policy: RetryPolicy,
    ) -> Self {
        ResolutionDemo {
            store,
            record_id,
            isolation,
            policy,
        }
    }

    /// Run the demo to completion and report what happened.
    pub fn run(&self) -> Result<DemoReport> {
        let initial = self.store.read(self.record_id)?;
        tracing::info!(
            record_id = self.record_id,
            initial = %initial,
            isolation = %self.isolation,
            max_attempts = self.policy.max_attempts,
            "running coordinated resolution demo"
        );

        let slow_runner = TransactionRunner::new(self.store, self.record_id, "guarded-add-50");
        let fast_runner = TransactionRunner::new(self.store, self.record_id, "guarded-add-30");
        let isolation = self.isolation;
        let coordinator = RetryCoordinator::new(self.policy);

        let (slow, fast) = run_both(
            || coordinator.run_with_retry(&slow_runner, Decimal::from(SLOW_DELTA), isolation),
            || coordinator.run_with_retry(&fast_runner, Decimal::from(FAST_DELTA), isolation),
        )?;

        let final_value = self.store.read(self.record_id)?;
        Ok(DemoReport {
            initial,
            expected: initial + Decimal::from(SLOW_DELTA + FAST_DELTA),
            final_value,
            outcomes: [slow, fast],
        })
    }
}

/// Launch the two sides concurrently and await both.
///
/// A panicking worker is a harness bug, surfaced as [`Error::Internal`]
/// rather than poisoning the caller.
fn run_both<F1, F2>(slow: F1, fast: F2) -> Result<(TransactionOutcome, TransactionOutcome)>
where
    F1: FnOnce() -> TransactionOutcome + Send,
    F2: FnOnce() -> TransactionOutcome + Send,
{
    thread::scope(|s| {
        let slow_handle = s.spawn(slow);
        let fast_handle = s.spawn(fast);
        let slow = slow_handle
            .join()
            .map_err(|_| Error::Internal("slow demo worker panicked".into()))?;
        let fast = fast_handle
            .join()
            .map_err(|_| Error::Internal("fast demo worker panicked".into()))?;
        Ok((slow, fast))
    })
}
