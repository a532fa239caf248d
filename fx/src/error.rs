//! FX error types.

use thiserror::Error;
use valuesplit_common::CurrencyPair;

/// Errors that can occur when resolving exchange rates.
///
/// These stay at the provider/cache boundary: the aggregator degrades
/// to face-value summation instead of propagating them.
#[derive(Debug, Clone, Error)]
pub enum FxError {
    /// No rate could be resolved for the requested currency pair.
    #[error("Rate not available for {0}")]
    RateUnavailable(CurrencyPair),

    /// The external rate provider returned an error.
    #[error("Rate provider error: {0}")]
    Provider(String),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
