//! Rate provider boundary.
//!
//! The provider is an opaque external collaborator. The core imposes
//! no timeout of its own; the provider's timeout governs, and a
//! provider failure surfaces as an unresolved rate rather than a
//! fault that aborts the whole aggregation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use valuesplit_common::Currency;

use crate::error::FxResult;

/// Trait for external exchange-rate providers.
///
/// `fetch_rates` returns, for each requested quote currency, the
/// multiplier that converts one unit of that currency into the base
/// currency. Quotes the provider cannot price may simply be absent
/// from the returned map.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch rates converting each of `quotes` into `base`.
    async fn fetch_rates(
        &self,
        base: &Currency,
        quotes: &[Currency],
    ) -> FxResult<HashMap<Currency, Decimal>>;
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    rates: dashmap::DashMap<(Currency, Currency), Decimal>,
    failing: std::sync::atomic::AtomicBool,
    fetch_count: std::sync::atomic::AtomicUsize,
    latency: parking_lot::Mutex<std::time::Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            failing: std::sync::atomic::AtomicBool::new(false),
            fetch_count: std::sync::atomic::AtomicUsize::new(0),
            latency: parking_lot::Mutex::new(std::time::Duration::ZERO),
        }
    }

    /// Set the rate converting one unit of `quote` into `base`.
    pub fn set_rate(&self, base: Currency, quote: Currency, rate: Decimal) {
        self.rates.insert((base, quote), rate);
    }

    /// Make every fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Delay responses, so tests can overlap concurrent fetches.
    pub fn set_latency(&self, latency: std::time::Duration) {
        *self.latency.lock() = latency;
    }

    /// Number of fetches issued against this provider.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(
        &self,
        base: &Currency,
        quotes: &[Currency],
    ) -> FxResult<HashMap<Currency, Decimal>> {
        use crate::error::FxError;

        self.fetch_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(FxError::Provider("mock provider failure".to_string()));
        }

        let mut resolved = HashMap::new();
        for quote in quotes {
            if let Some(rate) = self.rates.get(&(base.clone(), quote.clone())) {
                resolved.insert(quote.clone(), *rate);
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_provider_resolves_known_quotes() {
        let provider = MockRateProvider::new("test");
        provider.set_rate(Currency::usd(), Currency::eur(), dec!(1.08));

        let rates = provider
            .fetch_rates(&Currency::usd(), &[Currency::eur(), Currency::gbp()])
            .await
            .unwrap();

        assert_eq!(rates.get(&Currency::eur()), Some(&dec!(1.08)));
        assert!(!rates.contains_key(&Currency::gbp()));
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockRateProvider::new("test");
        provider.set_failing(true);

        let result = provider
            .fetch_rates(&Currency::usd(), &[Currency::eur()])
            .await;

        assert!(result.is_err());
    }
}
