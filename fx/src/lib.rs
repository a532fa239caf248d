//! ValueSplit FX
//!
//! Currency conversion cache and multi-currency aggregation for the
//! ValueSplit allocation ledger.
//!
//! # Features
//!
//! - Session-wide rate memoization with in-flight request coalescing
//! - Multi-currency aggregation with an exact same-currency fast path
//! - Graceful degradation to face-value summation when rates are
//!   unavailable
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use valuesplit_fx::{Aggregator, PricedItem, RateCache};
//! use valuesplit_common::Currency;
//!
//! let cache = Arc::new(RateCache::new(provider));
//! let aggregator = Aggregator::new(cache);
//!
//! let items = vec![
//!     PricedItem::new(amount_a, Currency::usd()),
//!     PricedItem::new(amount_b, Currency::eur()),
//! ];
//! let total = aggregator.aggregate(&items, Some(Currency::usd())).await;
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod provider;

pub use aggregate::{AggregateTotal, Aggregator, AggregatorConfig, PricedItem};
pub use cache::{CacheStats, RateCache, SharedRateCache};
pub use error::{FxError, FxResult};
pub use provider::RateProvider;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
