//! Unified error types for datacap.
//!
//! The retry layer distinguishes "retry this" from "fail now" by an explicit
//! tag check ([`Error::is_transient`]) rather than by error type downcasting.

use thiserror::Error;

/// All datacap errors.
///
/// This is the canonical error type for all store and harness operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Update-intent lock could not be acquired within the store's wait budget.
    ///
    /// Transient: a retry with fresh data may succeed once the competing
    /// transaction commits or rolls back.
    #[error("lock wait timeout on record {record_id} after {waited_ms}ms")]
    LockTimeout {
        /// Record whose update-intent lock was contended
        record_id: u32,
        /// How long the acquirer waited before giving up
        waited_ms: u64,
    },

    /// Commit-time validation failed under snapshot isolation.
    ///
    /// The record's version moved between the snapshot read and the commit;
    /// first committer wins, this transaction must re-read and retry.
    #[error(
        "serialization conflict on record {record_id}: read version {read_version}, \
         committed version {committed_version}"
    )]
    SerializationConflict {
        /// Record that was concurrently modified
        record_id: u32,
        /// Version observed by this transaction's read
        read_version: u64,
        /// Version found at commit time
        committed_version: u64,
    },

    /// Retry budget exhausted; carries the last transient failure.
    ///
    /// Reported distinctly from other failures so a demo can say
    /// "failed after N attempts" rather than a generic error.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts actually issued
        attempts: u32,
        /// The transient failure observed on the final attempt
        last: Box<Error>,
    },

    /// Counter record does not exist
    #[error("record not found: {0}")]
    RecordNotFound(u32),

    /// Customer does not exist
    #[error("customer not found: {0}")]
    CustomerNotFound(u32),

    /// Store connection/transport failure; never retried automatically
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Malformed input, rejected before any store mutation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for datacap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check whether this failure is a transient conflict.
    ///
    /// Transient conflicts (lock-wait timeout, serialization conflict) may
    /// succeed on retry with fresh data; everything else is terminal for the
    /// retry layer.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::LockTimeout { .. } | Error::SerializationConflict { .. }
        )
    }

    /// Check whether this is a retry-exhaustion report.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::RetriesExhausted { .. })
    }

    /// Stable machine-readable code for CLI/JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::LockTimeout { .. } => "LockTimeout",
            Error::SerializationConflict { .. } => "SerializationConflict",
            Error::RetriesExhausted { .. } => "RetriesExhausted",
            Error::RecordNotFound(_) => "RecordNotFound",
            Error::CustomerNotFound(_) => "CustomerNotFound",
            Error::Unavailable(_) => "Unavailable",
            Error::InvalidInput(_) => "InvalidInput",
            Error::Internal(_) => "Internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_timeout_is_transient() {
        let err = Error::LockTimeout {
            record_id: 1,
            waited_ms: 50,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn serialization_conflict_is_transient() {
        let err = Error::SerializationConflict {
            record_id: 1,
            read_version: 3,
            committed_version: 4,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn terminal_errors_are_not_transient() {
        let exhausted = Error::RetriesExhausted {
            attempts: 3,
            last: Box::new(Error::LockTimeout {
                record_id: 1,
                waited_ms: 50,
            }),
        };
        assert!(!exhausted.is_transient());
        assert!(exhausted.is_exhausted());

        assert!(!Error::Unavailable("connection refused".into()).is_transient());
        assert!(!Error::InvalidInput("bad delta".into()).is_transient());
        assert!(!Error::RecordNotFound(9).is_transient());
    }

    #[test]
    fn exhaustion_message_names_attempt_count() {
        let err = Error::RetriesExhausted {
            attempts: 5,
            last: Box::new(Error::LockTimeout {
                record_id: 1,
                waited_ms: 20,
            }),
        };
        assert!(err.to_string().contains("after 5 attempts"));
    }
}
