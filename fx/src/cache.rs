//! Rate caching with in-flight request coalescing.
//!
//! The cache is created once per session and memoizes rates for its
//! whole lifetime; rates are treated as good enough for display, not
//! for settlement, so entries are never invalidated. Concurrent
//! requests for the same uncached pair share a single provider call.

use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use valuesplit_common::{Currency, CurrencyPair};

use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;

/// Thread-safe session-wide rate cache.
///
/// Keyed by `(source, target)` pair. Each pair owns a `OnceCell`
/// whose initialization performs the provider fetch; callers that
/// arrive while a fetch is in flight await the same result. A failed
/// fetch leaves the cell empty (no rate stored, no stale fallback),
/// so a later caller may retry.
pub struct RateCache {
    provider: Arc<dyn RateProvider>,
    entries: DashMap<CurrencyPair, Arc<OnceCell<Decimal>>>,
}

impl RateCache {
    /// Create a new cache backed by the given provider.
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self {
            provider,
            entries: DashMap::new(),
        }
    }

    /// Resolve the rate converting one unit of `source` into `target`.
    ///
    /// A source equal to the target resolves to 1 without touching the
    /// provider. `None` means the rate is unavailable; the caller
    /// decides how to degrade.
    pub async fn rate(&self, target: &Currency, source: &Currency) -> Option<Decimal> {
        if source == target {
            return Some(Decimal::ONE);
        }

        let pair = CurrencyPair::new(source.clone(), target.clone());

        // Clone the cell out so the map shard is not held across the await.
        let cell = self
            .entries
            .entry(pair.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_try_init(|| self.fetch_single(&pair))
            .await;

        match result {
            Ok(rate) => {
                debug!(pair = %pair, rate = %rate, "Rate resolved");
                Some(*rate)
            }
            Err(e) => {
                warn!(pair = %pair, error = %e, "Rate left unresolved");
                None
            }
        }
    }

    /// Resolve rates from every source currency into the target.
    ///
    /// Sources equal to the target map to 1 and are never fetched.
    /// Unresolvable pairs are simply absent from the returned map.
    pub async fn rates_for(
        &self,
        target: &Currency,
        sources: &HashSet<Currency>,
    ) -> HashMap<Currency, Decimal> {
        let mut resolved = HashMap::new();

        for source in sources {
            if let Some(rate) = self.rate(target, source).await {
                resolved.insert(source.clone(), rate);
            }
        }

        resolved
    }

    /// Number of pairs the cache has seen (resolved or attempted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache has seen no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let resolved = self
            .entries
            .iter()
            .filter(|e| e.value().get().is_some())
            .count();

        CacheStats {
            total_pairs: total,
            resolved_pairs: resolved,
            unresolved_pairs: total - resolved,
        }
    }

    async fn fetch_single(&self, pair: &CurrencyPair) -> FxResult<Decimal> {
        debug!(pair = %pair, provider = self.provider.name(), "Fetching rate");

        let quotes = [pair.base.clone()];
        let rates = self.provider.fetch_rates(&pair.quote, &quotes).await?;

        let rate = rates
            .get(&pair.base)
            .copied()
            .ok_or_else(|| FxError::RateUnavailable(pair.clone()))?;

        if rate <= Decimal::ZERO {
            return Err(FxError::RateUnavailable(pair.clone()));
        }

        Ok(rate)
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_pairs: usize,
    pub resolved_pairs: usize,
    pub unresolved_pairs: usize,
}

/// Shared session-wide rate cache.
pub type SharedRateCache = Arc<RateCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockRateProvider;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn setup() -> (Arc<MockRateProvider>, RateCache) {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rate(Currency::usd(), Currency::eur(), dec!(1.08));
        let cache = RateCache::new(provider.clone());
        (provider, cache)
    }

    #[tokio::test]
    async fn test_identity_rate_never_fetched() {
        let (provider, cache) = setup();

        let rate = cache.rate(&Currency::usd(), &Currency::usd()).await;

        assert_eq!(rate, Some(Decimal::ONE));
        assert_eq!(provider.fetch_count(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_memoization() {
        let (provider, cache) = setup();

        let first = cache.rate(&Currency::usd(), &Currency::eur()).await;
        let second = cache.rate(&Currency::usd(), &Currency::eur()).await;

        assert_eq!(first, Some(dec!(1.08)));
        assert_eq!(second, Some(dec!(1.08)));
        assert_eq!(provider.fetch_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesced() {
        let (provider, cache) = setup();
        provider.set_latency(Duration::from_millis(50));
        let cache = Arc::new(cache);

        let c1 = cache.clone();
        let c2 = cache.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { c1.rate(&Currency::usd(), &Currency::eur()).await }),
            tokio::spawn(async move { c2.rate(&Currency::usd(), &Currency::eur()).await }),
        );

        assert_eq!(r1.unwrap(), Some(dec!(1.08)));
        assert_eq!(r2.unwrap(), Some(dec!(1.08)));
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_pair_unresolved() {
        let (provider, cache) = setup();
        provider.set_failing(true);

        let rate = cache.rate(&Currency::usd(), &Currency::eur()).await;
        assert_eq!(rate, None);
        assert_eq!(cache.stats().resolved_pairs, 0);

        // Nothing stale was stored; once the provider recovers the
        // next call fetches again and succeeds.
        provider.set_failing(false);
        let rate = cache.rate(&Currency::usd(), &Currency::eur()).await;

        assert_eq!(rate, Some(dec!(1.08)));
        assert_eq!(provider.fetch_count(), 2);
        assert_eq!(cache.stats().resolved_pairs, 1);
    }

    #[tokio::test]
    async fn test_rates_for_set() {
        let (provider, cache) = setup();
        provider.set_rate(Currency::usd(), Currency::gbp(), dec!(1.27));

        let sources: HashSet<Currency> = [Currency::usd(), Currency::eur(), Currency::gbp()]
            .into_iter()
            .collect();
        let rates = cache.rates_for(&Currency::usd(), &sources).await;

        assert_eq!(rates.get(&Currency::usd()), Some(&Decimal::ONE));
        assert_eq!(rates.get(&Currency::eur()), Some(&dec!(1.08)));
        assert_eq!(rates.get(&Currency::gbp()), Some(&dec!(1.27)));
        // Only the two non-identity pairs hit the provider.
        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_quote_unresolved() {
        let (provider, cache) = setup();

        let sources: HashSet<Currency> = [Currency::jpy()].into_iter().collect();
        let rates = cache.rates_for(&Currency::usd(), &sources).await;

        assert!(rates.is_empty());
        assert_eq!(provider.fetch_count(), 1);
    }
}
