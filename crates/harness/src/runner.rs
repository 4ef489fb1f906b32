//! Single-attempt transaction execution.

use rust_decimal::Decimal;
use std::time::Duration;

use datacap_core::traits::CounterStore;
use datacap_core::types::{IsolationLevel, TransactionOutcome};

/// Executes one "add N to the counter" operation as a single atomic unit.
///
/// A runner invocation is exactly one attempt: any failure is converted into
/// a failed [`TransactionOutcome`] and never retried here. Retry lives in
/// [`crate::RetryCoordinator`].
pub struct TransactionRunner<'a, S: CounterStore + ?Sized> {
    store: &'a S,
    record_id: u32,
    label: String,
}

impl<'a, S: CounterStore + ?Sized> TransactionRunner<'a, S> {
    /// Create a runner for one record with a report label.
    pub fn new(store: &'a S, record_id: u32, label: impl Into<String>) -> Self {
        TransactionRunner {
            store,
            record_id,
            label: label.into(),
        }
    }

    /// The label this runner stamps on its outcomes.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run one attempt at the given isolation level.
    ///
    /// `artificial_delay` widens the read-to-write race window; it is a test
    /// fixture for the anomaly demonstration and stays zero elsewhere.
    pub fn run(
        &self,
        delta: Decimal,
        isolation: IsolationLevel,
        artificial_delay: Duration,
    ) -> TransactionOutcome {
        match self
            .store
            .locked_add(self.record_id, delta, isolation, artificial_delay)
        {
            Ok(committed) => TransactionOutcome::success(&self.label, 1, committed),
            Err(e) => TransactionOutcome::failure(&self.label, 1, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedStore;
    use datacap_core::error::Error;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn success_maps_to_outcome_with_committed_value() {
        let store = ScriptedStore::succeeding_after(0, dec("100"));
        let runner = TransactionRunner::new(&store, 1, "t1");
        let outcome = runner.run(dec("50"), IsolationLevel::Serializable, Duration::ZERO);

        assert!(outcome.succeeded());
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(outcome.final_value, Some(dec("150")));
        assert_eq!(outcome.label, "t1");
    }

    #[test]
    fn failure_is_reported_not_thrown() {
        let store = ScriptedStore::always_failing(Error::Unavailable("down".into()));
        let runner = TransactionRunner::new(&store, 1, "t1");
        let outcome = runner.run(dec("50"), IsolationLevel::Serializable, Duration::ZERO);

        assert!(!outcome.succeeded());
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(outcome.error, Some(Error::Unavailable("down".into())));
    }

    #[test]
    fn one_invocation_is_one_store_call() {
        let store = ScriptedStore::succeeding_after(2, dec("100"));
        let runner = TransactionRunner::new(&store, 1, "t1");
        let outcome = runner.run(dec("50"), IsolationLevel::Serializable, Duration::ZERO);

        // The scripted store fails the first two calls; the runner must not
        // have retried past its single attempt.
        assert!(!outcome.succeeded());
        assert_eq!(store.calls(), 1);
    }
}
