//! Scripted store double for harness unit tests.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use datacap_core::error::{Error, Result};
use datacap_core::traits::CounterStore;
use datacap_core::types::IsolationLevel;

/// A counter store that fails a scripted number of `locked_add` calls with a
/// transient conflict (or always fails with a fixed error) before applying
/// deltas for real. Tracks call and apply counts so tests can assert that
/// failed attempts never partially commit.
pub struct ScriptedStore {
    value: Mutex<Decimal>,
    failures_remaining: AtomicU32,
    fixed_error: Option<Error>,
    calls: AtomicU32,
    applies: AtomicU32,
}

impl ScriptedStore {
    /// Succeed after `failures` transient lock-timeout failures.
    pub fn succeeding_after(failures: u32, initial: Decimal) -> Self {
        ScriptedStore {
            value: Mutex::new(initial),
            failures_remaining: AtomicU32::new(failures),
            fixed_error: None,
            calls: AtomicU32::new(0),
            applies: AtomicU32::new(0),
        }
    }

    /// Fail every `locked_add` with the given error.
    pub fn always_failing(error: Error) -> Self {
        ScriptedStore {
            value: Mutex::new(Decimal::ZERO),
            failures_remaining: AtomicU32::new(0),
            fixed_error: Some(error),
            calls: AtomicU32::new(0),
            applies: AtomicU32::new(0),
        }
    }

    /// Total `locked_add` invocations observed.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successful delta applications observed.
    pub fn applies(&self) -> u32 {
        self.applies.load(Ordering::SeqCst)
    }
}

impl CounterStore for ScriptedStore {
    fn read(&self, _record_id: u32) -> Result<Decimal> {
        Ok(*self.value.lock())
    }

    fn reset(&self, _record_id: u32, value: Decimal) -> Result<()> {
        *self.value.lock() = value;
        Ok(())
    }

    fn locked_add(
        &self,
        record_id: u32,
        delta: Decimal,
        _isolation: IsolationLevel,
        _artificial_delay: Duration,
    ) -> Result<Decimal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.fixed_error {
            return Err(error.clone());
        }
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::LockTimeout {
                record_id,
                waited_ms: 10,
            });
        }
        let mut value = self.value.lock();
        *value += delta;
        self.applies.fetch_add(1, Ordering::SeqCst);
        Ok(*value)
    }
}
