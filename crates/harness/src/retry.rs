//! Bounded retry with linear backoff around a transaction runner.

use rust_decimal::Decimal;
use std::thread;
use std::time::Duration;

use datacap_core::error::Error;
use datacap_core::traits::CounterStore;
use datacap_core::types::{IsolationLevel, RetryPolicy, TransactionOutcome};

use crate::runner::TransactionRunner;

/// Wraps [`TransactionRunner`] invocations with bounded retry.
///
/// Only transient conflicts (lock-wait timeout, serialization conflict) are
/// retried; everything else is terminal on the first occurrence. Backoff
/// before attempt `n + 1` is `backoff_base * n`, spreading repeated
/// contention between competing transactions without a fixed ceiling. The
/// caller bounds total latency through `max_attempts`.
pub struct RetryCoordinator {
    policy: RetryPolicy,
}

impl RetryCoordinator {
    /// Create a coordinator with the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        RetryCoordinator { policy }
    }

    /// The policy this coordinator applies.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Drive one add operation to completion or exhaustion.
    ///
    /// Every attempt runs with a zero artificial delay — the race-window
    /// fixture belongs to the anomaly demonstration, not the corrected path.
    /// The returned outcome's `attempts_used` equals the number of transient
    /// failures observed plus one.
    pub fn run_with_retry<S: CounterStore + ?Sized>(
        &self,
        runner: &TransactionRunner<'_, S>,
        delta: Decimal,
        isolation: IsolationLevel,
    ) -> TransactionOutcome {
        let mut failed_attempts = 0u32;

        loop {
            let mut attempt = runner.run(delta, isolation, Duration::ZERO);

            match attempt.error.take() {
                None => {
                    return TransactionOutcome {
                        attempts_used: failed_attempts + 1,
                        ..attempt
                    };
                }
                Some(conflict) if conflict.is_transient() => {
                    failed_attempts += 1;
                    if failed_attempts >= self.policy.max_attempts {
                        tracing::warn!(
                            label = runner.label(),
                            attempts = failed_attempts,
                            error = %conflict,
                            "retry budget exhausted"
                        );
                        return TransactionOutcome::failure(
                            runner.label(),
                            failed_attempts,
                            Error::RetriesExhausted {
                                attempts: failed_attempts,
                                last: Box::new(conflict),
                            },
                        );
                    }
                    let backoff = self.policy.backoff_for(failed_attempts);
                    tracing::debug!(
                        label = runner.label(),
                        attempt = failed_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %conflict,
                        "transient conflict, backing off before retry"
                    );
                    thread::sleep(backoff);
                }
                Some(terminal) => {
                    // Non-conflict failures are terminal immediately.
                    attempt.error = Some(terminal);
                    return TransactionOutcome {
                        attempts_used: failed_attempts + 1,
                        ..attempt
                    };
                }
            }
        }
    }
}
