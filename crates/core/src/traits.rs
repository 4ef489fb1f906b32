//! The store seam consumed by the transaction harness.

use rust_decimal::Decimal;
use std::time::Duration;

use crate::error::Result;
use crate::types::IsolationLevel;

/// Counter-record operations offered by the backing transactional store.
///
/// The harness is written against this trait so tests can substitute a
/// scripted store (forced conflicts, forced unavailability) for the real
/// engine. The record id is an explicit parameter everywhere; there is no
/// ambient "current record".
pub trait CounterStore: Send + Sync {
    /// Current value of the record.
    ///
    /// Non-blocking with respect to other readers.
    fn read(&self, record_id: u32) -> Result<Decimal>;

    /// Unconditionally overwrite the record, creating it if absent.
    ///
    /// Used only between demo runs, never concurrently with one; idempotent.
    fn reset(&self, record_id: u32, value: Decimal) -> Result<()>;

    /// Execute one atomic add transaction at the given isolation level and
    /// return the post-commit value.
    ///
    /// `artificial_delay` widens the race window between read and write and
    /// exists purely as a test fixture for the anomaly demonstration; the
    /// coordinated path always passes zero. If any step after the read
    /// fails, the record is left unchanged.
    fn locked_add(
        &self,
        record_id: u32,
        delta: Decimal,
        isolation: IsolationLevel,
        artificial_delay: Duration,
    ) -> Result<Decimal>;
}
