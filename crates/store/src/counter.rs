//! Shared counter records with per-record locking and versioned commits.
//!
//! Each record carries two synchronization primitives:
//!
//! - a **row latch** (`RwLock`) guarding individual reads and writes; it is
//!   never held across a suspension point
//! - an **update-intent lock** (`Mutex`) acquired by pessimistic isolation
//!   levels before reading and held until commit; other acquirers block, with
//!   a bounded wait that surfaces [`Error::LockTimeout`]
//!
//! The lock protocol per isolation level:
//!
//! | Level | Read | Commit |
//! |-------|------|--------|
//! | read-uncommitted | latched read, no lock | blind latched write |
//! | read-committed / repeatable-read / serializable | under update-intent lock | write, release lock |
//! | snapshot | version-stamped read, no lock | validate version, else conflict |
//!
//! Under read-uncommitted with no artificial delay the whole read-modify-write
//! runs inside a single latch acquisition (there is no suspension point to
//! interleave around). A non-zero artificial delay forces the latch to be
//! released across the sleep, which is the classic read-then-sleep-then-write
//! race the conflict demo exists to exhibit.

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use datacap_core::error::{Error, Result};
use datacap_core::traits::CounterStore;
use datacap_core::types::{CounterRecord, IsolationLevel};

/// Committed counter values carry two fractional digits.
const VALUE_SCALE: u32 = 2;

#[derive(Debug)]
struct CounterRow {
    value: Decimal,
    /// Bumped once per committed write; snapshot reads validate against it.
    version: u64,
}

#[derive(Debug)]
struct CounterSlot {
    row: RwLock<CounterRow>,
    update_lock: Mutex<()>,
}

impl CounterSlot {
    fn new(value: Decimal) -> Self {
        CounterSlot {
            row: RwLock::new(CounterRow { value, version: 0 }),
            update_lock: Mutex::new(()),
        }
    }
}

/// The in-process transactional store for shared usage records.
///
/// Records are keyed by explicit id; there is no ambient "current record".
/// All committed values are non-negative and rounded to two fractional
/// digits.
pub struct UsageStore {
    records: DashMap<u32, Arc<CounterSlot>>,
    lock_wait_timeout: Duration,
}

impl UsageStore {
    /// Create an empty store with the default 1s lock-wait budget.
    pub fn new() -> Self {
        UsageStore {
            records: DashMap::new(),
            lock_wait_timeout: Duration::from_secs(1),
        }
    }

    /// Override how long a pessimistic add waits for the update-intent lock
    /// before reporting a transient [`Error::LockTimeout`].
    pub fn with_lock_wait_timeout(mut self, timeout: Duration) -> Self {
        self.lock_wait_timeout = timeout;
        self
    }

    /// Snapshot of a record for display purposes.
    pub fn record(&self, record_id: u32) -> Result<CounterRecord> {
        let slot = self.slot(record_id)?;
        let row = slot.row.read();
        Ok(CounterRecord {
            id: record_id,
            value: row.value,
        })
    }

    fn slot(&self, record_id: u32) -> Result<Arc<CounterSlot>> {
        self.records
            .get(&record_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::RecordNotFound(record_id))
    }

    fn checked_next(record_id: u32, observed: Decimal, delta: Decimal) -> Result<Decimal> {
        let next = observed + delta;
        if next < Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "add of {delta} would drive record {record_id} negative (current {observed})"
            )));
        }
        Ok(next.round_dp(VALUE_SCALE))
    }

    /// Pessimistic path: update-intent lock from read to commit.
    fn add_locked(
        &self,
        slot: &CounterSlot,
        record_id: u32,
        delta: Decimal,
        artificial_delay: Duration,
    ) -> Result<Decimal> {
        let guard = slot
            .update_lock
            .try_lock_for(self.lock_wait_timeout)
            .ok_or(Error::LockTimeout {
                record_id,
                waited_ms: self.lock_wait_timeout.as_millis() as u64,
            })?;

        let observed = slot.row.read().value;
        if !artificial_delay.is_zero() {
            thread::sleep(artificial_delay);
        }
        let next = Self::checked_next(record_id, observed, delta)?;

        let committed = {
            let mut row = slot.row.write();
            row.value = next;
            row.version += 1;
            row.value
        };
        drop(guard);
        Ok(committed)
    }

    /// Optimistic path: version-stamped read, commit-time validation.
    fn add_validated(
        &self,
        slot: &CounterSlot,
        record_id: u32,
        delta: Decimal,
        artificial_delay: Duration,
    ) -> Result<Decimal> {
        let (observed, read_version) = {
            let row = slot.row.read();
            (row.value, row.version)
        };
        if !artificial_delay.is_zero() {
            thread::sleep(artificial_delay);
        }
        let next = Self::checked_next(record_id, observed, delta)?;

        let mut row = slot.row.write();
        if row.version != read_version {
            return Err(Error::SerializationConflict {
                record_id,
                read_version,
                committed_version: row.version,
            });
        }
        row.value = next;
        row.version += 1;
        Ok(row.value)
    }

    /// Weakest level: no read lock, blind last-writer-wins commit.
    fn add_unvalidated(
        &self,
        slot: &CounterSlot,
        record_id: u32,
        delta: Decimal,
        artificial_delay: Duration,
    ) -> Result<Decimal> {
        if artificial_delay.is_zero() {
            // No suspension point: the whole read-modify-write fits in one
            // latch acquisition.
            let mut row = slot.row.write();
            let next = Self::checked_next(record_id, row.value, delta)?;
            row.value = next;
            row.version += 1;
            return Ok(row.value);
        }

        // The latch cannot be held across a sleep. Releasing it between the
        // read and the write is what opens the lost-update window.
        let observed = slot.row.read().value;
        thread::sleep(artificial_delay);
        let next = Self::checked_next(record_id, observed, delta)?;

        let mut row = slot.row.write();
        row.value = next;
        row.version += 1;
        Ok(row.value)
    }
}

impl Default for UsageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore for UsageStore {
    fn read(&self, record_id: u32) -> Result<Decimal> {
        let slot = self.slot(record_id)?;
        let value = slot.row.read().value;
        Ok(value)
    }

    fn reset(&self, record_id: u32, value: Decimal) -> Result<()> {
        if value < Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "reset value must be non-negative, got {value}"
            )));
        }
        let value = value.round_dp(VALUE_SCALE);
        let slot = self
            .records
            .entry(record_id)
            .or_insert_with(|| Arc::new(CounterSlot::new(value)))
            .clone();
        let mut row = slot.row.write();
        row.value = value;
        row.version += 1;
        tracing::debug!(record_id, value = %value, "record reset");
        Ok(())
    }

    fn locked_add(
        &self,
        record_id: u32,
        delta: Decimal,
        isolation: IsolationLevel,
        artificial_delay: Duration,
    ) -> Result<Decimal> {
        let slot = self.slot(record_id)?;

        let result = if isolation.acquires_update_lock() {
            self.add_locked(&slot, record_id, delta, artificial_delay)
        } else if isolation.validates_at_commit() {
            self.add_validated(&slot, record_id, delta, artificial_delay)
        } else {
            self.add_unvalidated(&slot, record_id, delta, artificial_delay)
        };

        match &result {
            Ok(committed) => {
                tracing::debug!(
                    record_id,
                    isolation = %isolation,
                    delta = %delta,
                    committed = %committed,
                    "add transaction committed"
                );
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(record_id, isolation = %isolation, error = %e, "add transaction hit transient conflict");
            }
            Err(e) => {
                tracing::warn!(record_id, isolation = %isolation, error = %e, "add transaction failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn seeded(value: &str) -> UsageStore {
        let store = UsageStore::new();
        store.reset(1, dec(value)).unwrap();
        store
    }

    #[test]
    fn reset_is_idempotent() {
        let store = UsageStore::new();
        store.reset(1, dec("100")).unwrap();
        store.reset(1, dec("100")).unwrap();
        assert_eq!(store.read(1).unwrap(), dec("100"));
    }

    #[test]
    fn reset_rejects_negative_values() {
        let store = UsageStore::new();
        let err = store.reset(1, dec("-1")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn missing_record_is_reported() {
        let store = UsageStore::new();
        assert_eq!(store.read(7).unwrap_err(), Error::RecordNotFound(7));
        let err = store
            .locked_add(7, dec("1"), IsolationLevel::default(), Duration::ZERO)
            .unwrap_err();
        assert_eq!(err, Error::RecordNotFound(7));
    }

    #[test]
    fn committed_values_are_rounded_to_two_digits() {
        let store = seeded("100");
        let committed = store
            .locked_add(1, dec("0.005"), IsolationLevel::ReadCommitted, Duration::ZERO)
            .unwrap();
        assert_eq!(committed, dec("100.00"));
    }

    #[test]
    fn negative_result_fails_atomically() {
        let store = seeded("100");
        let err = store
            .locked_add(1, dec("-150"), IsolationLevel::ReadCommitted, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(store.read(1).unwrap(), dec("100"));
    }

    #[test]
    fn undelayed_adds_are_atomic_even_at_weakest_level() {
        let store = seeded("100");
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..25 {
                        store
                            .locked_add(
                                1,
                                dec("1"),
                                IsolationLevel::ReadUncommitted,
                                Duration::ZERO,
                            )
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(store.read(1).unwrap(), dec("300"));
    }

    #[test]
    fn delayed_weakest_level_loses_an_update() {
        let store = seeded("100");
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            // Reads 100 immediately, commits 150 well after the other side.
            s.spawn(|| {
                barrier.wait();
                store
                    .locked_add(
                        1,
                        dec("50"),
                        IsolationLevel::ReadUncommitted,
                        Duration::from_millis(300),
                    )
                    .unwrap();
            });
            // Commits 130 inside the other side's window.
            s.spawn(|| {
                barrier.wait();
                thread::sleep(Duration::from_millis(100));
                store
                    .locked_add(
                        1,
                        dec("30"),
                        IsolationLevel::ReadUncommitted,
                        Duration::ZERO,
                    )
                    .unwrap();
            });
        });
        // The delayed writer overwrote the concurrent commit.
        assert_eq!(store.read(1).unwrap(), dec("150"));
    }

    #[test]
    fn pessimistic_levels_serialize_competing_adds() {
        for level in [
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
        ] {
            let store = seeded("100");
            thread::scope(|s| {
                s.spawn(|| {
                    store
                        .locked_add(1, dec("50"), level, Duration::from_millis(50))
                        .unwrap();
                });
                s.spawn(|| {
                    store
                        .locked_add(1, dec("30"), level, Duration::from_millis(50))
                        .unwrap();
                });
            });
            assert_eq!(store.read(1).unwrap(), dec("180"), "level {level}");
        }
    }

    #[test]
    fn contended_update_lock_times_out() {
        let store = seeded("100").with_lock_wait_timeout(Duration::from_millis(40));
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            s.spawn(|| {
                barrier.wait();
                store
                    .locked_add(
                        1,
                        dec("50"),
                        IsolationLevel::Serializable,
                        Duration::from_millis(400),
                    )
                    .unwrap();
            });
            let loser = s.spawn(|| {
                barrier.wait();
                // Give the holder time to take the lock.
                thread::sleep(Duration::from_millis(100));
                store.locked_add(1, dec("30"), IsolationLevel::Serializable, Duration::ZERO)
            });
            let err = loser.join().unwrap().unwrap_err();
            assert!(err.is_transient());
            assert!(matches!(err, Error::LockTimeout { record_id: 1, .. }));
        });
        // Only the lock holder's delta landed.
        assert_eq!(store.read(1).unwrap(), dec("150"));
    }

    #[test]
    fn snapshot_conflict_goes_to_first_committer() {
        let store = seeded("100");
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            let stale = s.spawn(|| {
                barrier.wait();
                store.locked_add(
                    1,
                    dec("50"),
                    IsolationLevel::Snapshot,
                    Duration::from_millis(300),
                )
            });
            s.spawn(|| {
                barrier.wait();
                thread::sleep(Duration::from_millis(100));
                store
                    .locked_add(1, dec("30"), IsolationLevel::Snapshot, Duration::ZERO)
                    .unwrap();
            });
            let err = stale.join().unwrap().unwrap_err();
            assert!(matches!(err, Error::SerializationConflict { .. }));
        });
        // The stale transaction rolled back instead of overwriting.
        assert_eq!(store.read(1).unwrap(), dec("130"));
    }
}
