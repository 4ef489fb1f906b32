//! Shared data-model types.
//!
//! The counter side of the model is deliberately tiny: one decimal record,
//! identified explicitly by id rather than through ambient global state. The
//! customer/subscription types back the browsing and reporting collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Conventional id of the singleton usage record.
pub const USAGE_RECORD_ID: u32 = 1;

/// The shared mutable usage record.
///
/// Invariant: `value` is non-negative and carries at most two fractional
/// digits. The record is mutated only through a locked add transaction or an
/// explicit operator reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterRecord {
    /// Record identifier (conventionally [`USAGE_RECORD_ID`])
    pub id: u32,
    /// Current usage value in GB
    pub value: Decimal,
}

/// Standard SQL isolation levels selectable by the operator.
///
/// The default is [`IsolationLevel::ReadUncommitted`], the weakest level.
/// The unprotected demo path relies on that default explicitly rather than
/// on unspecified store behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationLevel {
    /// Weakest level: reads take no lock, writes are applied blindly
    ReadUncommitted,
    /// Pessimistic: update-intent lock held from read to commit
    ReadCommitted,
    /// Pessimistic: same single-record protocol as read-committed
    RepeatableRead,
    /// Pessimistic: same single-record protocol as read-committed
    Serializable,
    /// Optimistic: versioned read, commit-time validation, first committer wins
    Snapshot,
}

impl IsolationLevel {
    /// Levels that acquire the record's update-intent lock before reading.
    pub fn acquires_update_lock(&self) -> bool {
        matches!(
            self,
            IsolationLevel::ReadCommitted
                | IsolationLevel::RepeatableRead
                | IsolationLevel::Serializable
        )
    }

    /// Levels that validate the read version at commit time instead of locking.
    pub fn validates_at_commit(&self) -> bool {
        matches!(self, IsolationLevel::Snapshot)
    }

    /// Canonical kebab-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "read-uncommitted",
            IsolationLevel::ReadCommitted => "read-committed",
            IsolationLevel::RepeatableRead => "repeatable-read",
            IsolationLevel::Serializable => "serializable",
            IsolationLevel::Snapshot => "snapshot",
        }
    }

    /// All five levels, in increasing nominal strength order.
    pub fn all() -> [IsolationLevel; 5] {
        [
            IsolationLevel::ReadUncommitted,
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
            IsolationLevel::Snapshot,
        ]
    }
}

impl Default for IsolationLevel {
    fn default() -> Self {
        IsolationLevel::ReadUncommitted
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsolationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read-uncommitted" => Ok(IsolationLevel::ReadUncommitted),
            "read-committed" => Ok(IsolationLevel::ReadCommitted),
            "repeatable-read" => Ok(IsolationLevel::RepeatableRead),
            "serializable" => Ok(IsolationLevel::Serializable),
            "snapshot" => Ok(IsolationLevel::Snapshot),
            other => Err(Error::InvalidInput(format!(
                "unknown isolation level '{other}'"
            ))),
        }
    }
}

/// Bounded retry configuration for the coordinated path.
///
/// Backoff is linear: attempt `n` (1-based) sleeps `backoff_base * n` before
/// the next try, spreading repeated contention between competing
/// transactions without a fixed ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first (always >= 1)
    pub max_attempts: u32,
    /// Base backoff duration, scaled by the attempt count (always > 0)
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Create a policy, rejecting zero attempts or a zero backoff base.
    pub fn new(max_attempts: u32, backoff_base_ms: u64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidInput(
                "max_attempts must be a positive integer".into(),
            ));
        }
        if backoff_base_ms == 0 {
            return Err(Error::InvalidInput(
                "backoff_base_ms must be a positive integer".into(),
            ));
        }
        Ok(RetryPolicy {
            max_attempts,
            backoff_base: Duration::from_millis(backoff_base_ms),
        })
    }

    /// Backoff to sleep after the given number of failed attempts (1-based).
    pub fn backoff_for(&self, failed_attempts: u32) -> Duration {
        self.backoff_base * failed_attempts
    }
}

impl Default for RetryPolicy {
    /// Three attempts, 40ms base backoff.
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_millis(40),
        }
    }
}

/// Result of one runner or coordinator invocation.
///
/// Produced once per invocation and consumed by the demo orchestrators for
/// reporting; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    /// Caller-chosen label identifying the transaction in reports
    pub label: String,
    /// Attempts actually issued: transient failures observed plus one
    pub attempts_used: u32,
    /// Post-commit value, present only on success
    pub final_value: Option<Decimal>,
    /// Failure detail, present only on failure
    pub error: Option<Error>,
}

impl TransactionOutcome {
    /// Successful outcome.
    pub fn success(label: impl Into<String>, attempts_used: u32, final_value: Decimal) -> Self {
        TransactionOutcome {
            label: label.into(),
            attempts_used,
            final_value: Some(final_value),
            error: None,
        }
    }

    /// Failed outcome.
    pub fn failure(label: impl Into<String>, attempts_used: u32, error: Error) -> Self {
        TransactionOutcome {
            label: label.into(),
            attempts_used,
            final_value: None,
            error: Some(error),
        }
    }

    /// Whether the transaction committed.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A customer record, the browsing collaborator's unit of data.
///
/// The id is immutable after creation; the remaining fields are editable
/// through the directory's update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Immutable customer identifier
    pub id: u32,
    /// Given name (required)
    pub first_name: String,
    /// Family name (required)
    pub last_name: String,
    /// Email address (required, must be well-formed)
    pub email: String,
    /// Phone number (required, digits only)
    pub phone: String,
    /// Postal address (required)
    pub address: String,
    /// Whether the subscription is currently active
    pub active: bool,
}

/// Filter for paged customer listing.
///
/// Prefix filters match case-insensitively; `active` is tri-state, with
/// `None` meaning "either".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Prefix on the first name, if any
    pub first_name_prefix: Option<String>,
    /// Prefix on the last name, if any
    pub last_name_prefix: Option<String>,
    /// Tri-state active flag
    pub active: Option<bool>,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1
    pub page: usize,
    /// Items per page (always >= 1)
    pub per_page: usize,
}

impl PageRequest {
    /// Create a page request, rejecting a zero page number or page size.
    pub fn new(page: usize, per_page: usize) -> Result<Self> {
        if page == 0 {
            return Err(Error::InvalidInput("page numbers start at 1".into()));
        }
        if per_page == 0 {
            return Err(Error::InvalidInput("per_page must be at least 1".into()));
        }
        Ok(PageRequest { page, per_page })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: 10,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in listing order
    pub items: Vec<T>,
    /// Page number (1-based)
    pub page: usize,
    /// Requested page size
    pub per_page: usize,
    /// Total matching items across all pages
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Total number of pages for this result set.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page)
    }
}

/// Per-customer tariff and consumption, feeding the usage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Tariff plan name
    pub tariff_name: String,
    /// Advertised speed in Mbit/s
    pub tariff_speed_mbps: u32,
    /// Included data allowance in GB
    pub data_cap_gb: Decimal,
    /// Data consumed so far in GB
    pub data_used_gb: Decimal,
    /// Days the subscription has been active in the period
    pub days_active: u32,
}

/// One row of the exceeded-usage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReportRow {
    /// Customer identifier
    pub customer_id: u32,
    /// "First Last" display name
    pub customer_name: String,
    /// Tariff plan name
    pub tariff_name: String,
    /// Advertised speed in Mbit/s
    pub tariff_speed_mbps: u32,
    /// Total data consumed in GB
    pub total_data_used_gb: Decimal,
    /// Consumption beyond the allowance in GB
    pub excess_data_gb: Decimal,
    /// Days active in the period
    pub days_active: u32,
    /// Average daily consumption in GB
    pub avg_daily_usage_gb: Decimal,
    /// Display status of the subscription
    pub subscription_status: String,
}
