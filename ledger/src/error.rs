//! Allocation ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;
use valuesplit_common::ServiceId;

/// Errors that can occur when validating ledger mutations.
///
/// All variants are recoverable and surfaced to the caller as values;
/// none of them aborts an in-progress computation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Proposed allocation amount is zero or negative.
    #[error("Allocation amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },

    /// Proposed amount exceeds the remaining balance.
    /// Carries the exact remaining amount so the caller can suggest a correction.
    #[error("Amount {requested} exceeds remaining balance {remaining}")]
    ExceedsRemaining {
        requested: Decimal,
        remaining: Decimal,
    },

    /// Service is locked to a recurring invoice template; no mutations allowed.
    #[error("Service {0} is locked to a recurring template")]
    ServiceLocked(ServiceId),

    /// Proposed service price is negative.
    #[error("Service price must be non-negative, got {price}")]
    NegativePrice { price: Decimal },

    /// Proposed service price falls below the already-consumed total.
    #[error("Price {requested} is below the consumed total {consumed}")]
    PriceBelowConsumed {
        requested: Decimal,
        consumed: Decimal,
    },

    /// Requested invoicing percentage is outside (0, 100].
    #[error("Percentage must be in (0, 100], got {percent}")]
    InvalidPercent { percent: Decimal },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, AllocationError>;
