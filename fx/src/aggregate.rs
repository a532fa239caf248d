//! Multi-currency aggregation.
//!
//! Rolls a collection of priced items up into a single total in one
//! display currency. Aggregation is infallible: when a rate cannot be
//! resolved the affected amounts are summed at face value and the
//! `has_mixed_currencies` flag tells the caller the figure may be
//! approximate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use valuesplit_common::{Currency, CurrencyPair, ExchangeRate, Money};

use crate::cache::SharedRateCache;

/// An amount with its currency, as fed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    /// The amount value.
    pub amount: Decimal,
    /// Currency the amount is denominated in.
    pub currency: Currency,
}

impl PricedItem {
    /// Create a new priced item.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl From<Money> for PricedItem {
    fn from(money: Money) -> Self {
        Self {
            amount: money.value,
            currency: money.currency,
        }
    }
}

/// Result of aggregating priced items into one display figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTotal {
    /// The summed total in the display currency.
    pub total: Decimal,
    /// Currency the total is presented in.
    pub display_currency: Currency,
    /// True when more than one source currency was involved,
    /// regardless of whether every conversion succeeded. Signals that
    /// the figure may be approximate.
    pub has_mixed_currencies: bool,
}

impl AggregateTotal {
    /// Wrap a server-precomputed total verbatim.
    ///
    /// Bypasses all client-side computation and rate lookups; never
    /// flags mixed currencies.
    pub fn from_precomputed(total: Decimal, currency: Currency) -> Self {
        Self {
            total,
            display_currency: currency,
            has_mixed_currencies: false,
        }
    }

    /// The total as a typed amount.
    pub fn total_money(&self) -> Money {
        Money::new(self.total, self.display_currency.clone())
    }
}

/// Configuration for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Display currency used when aggregating an empty collection
    /// with no explicit display currency.
    pub fallback_display: Currency,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            fallback_display: Currency::usd(),
        }
    }
}

/// Multi-currency aggregator backed by the session rate cache.
pub struct Aggregator {
    cache: SharedRateCache,
    config: AggregatorConfig,
}

impl Aggregator {
    /// Create a new aggregator with default configuration.
    pub fn new(cache: SharedRateCache) -> Self {
        Self::with_config(cache, AggregatorConfig::default())
    }

    /// Create a new aggregator with custom configuration.
    pub fn with_config(cache: SharedRateCache, config: AggregatorConfig) -> Self {
        Self { cache, config }
    }

    /// Aggregate items into one total in the display currency.
    ///
    /// When `display` is not supplied it defaults to the single shared
    /// currency, or to the first encountered currency for mixed input.
    #[instrument(skip(self, items, display), fields(items = items.len()))]
    pub async fn aggregate(
        &self,
        items: &[PricedItem],
        display: Option<Currency>,
    ) -> AggregateTotal {
        if items.is_empty() {
            return AggregateTotal {
                total: Decimal::ZERO,
                display_currency: display.unwrap_or_else(|| self.config.fallback_display.clone()),
                has_mixed_currencies: false,
            };
        }

        // Distinct source currencies in encounter order.
        let mut source_currencies: Vec<Currency> = Vec::new();
        for item in items {
            if !source_currencies.contains(&item.currency) {
                source_currencies.push(item.currency.clone());
            }
        }
        let has_mixed_currencies = source_currencies.len() > 1;

        // Fast path: one shared currency and no conflicting display
        // request. Exact decimal sum, no rate lookup at all.
        let single = &source_currencies[0];
        let display_matches = display.as_ref().map_or(true, |d| d == single);
        if !has_mixed_currencies && display_matches {
            let total: Decimal = items.iter().map(|i| i.amount).sum();
            debug!(currency = %single, total = %total, "Single-currency fast path");
            return AggregateTotal {
                total,
                display_currency: single.clone(),
                has_mixed_currencies: false,
            };
        }

        let display_currency = display.unwrap_or_else(|| source_currencies[0].clone());

        let sources: HashSet<Currency> = source_currencies
            .iter()
            .filter(|c| **c != display_currency)
            .cloned()
            .collect();
        let rates = self.cache.rates_for(&display_currency, &sources).await;

        let mut total = Decimal::ZERO;
        for item in items {
            if item.currency == display_currency {
                total += item.amount;
            } else if let Some(rate) = rates.get(&item.currency) {
                let rate = ExchangeRate::new(
                    CurrencyPair::new(item.currency.clone(), display_currency.clone()),
                    *rate,
                );
                // Pair base is the item's own currency, so the
                // conversion cannot mismatch; the fallback is face
                // value, same as a missing rate.
                total += rate
                    .convert(&Money::new(item.amount, item.currency.clone()))
                    .map(|m| m.value)
                    .unwrap_or(item.amount);
            } else {
                // Degraded path: no rate, sum at face value. The
                // mixed-currencies flag stays set as the caller's
                // signal that the figure is approximate.
                warn!(
                    currency = %item.currency,
                    display = %display_currency,
                    amount = %item.amount,
                    "Rate unavailable, summing at face value"
                );
                total += item.amount;
            }
        }

        AggregateTotal {
            total,
            display_currency,
            has_mixed_currencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RateCache;
    use crate::provider::MockRateProvider;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup() -> (Arc<MockRateProvider>, Aggregator) {
        let provider = Arc::new(MockRateProvider::new("test"));
        let cache = Arc::new(RateCache::new(provider.clone()));
        (provider, Aggregator::new(cache))
    }

    fn usd(amount: Decimal) -> PricedItem {
        PricedItem::new(amount, Currency::usd())
    }

    fn eur(amount: Decimal) -> PricedItem {
        PricedItem::new(amount, Currency::eur())
    }

    #[tokio::test]
    async fn test_empty_items() {
        let (provider, aggregator) = setup();

        let result = aggregator.aggregate(&[], None).await;

        assert_eq!(result.total, Decimal::ZERO);
        assert_eq!(result.display_currency, Currency::usd());
        assert!(!result.has_mixed_currencies);
        assert_eq!(provider.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_single_currency_fast_path() {
        let (provider, aggregator) = setup();
        let items = vec![usd(dec!(10)), usd(dec!(5))];

        let result = aggregator.aggregate(&items, None).await;

        assert_eq!(result.total, dec!(15));
        assert_eq!(result.display_currency, Currency::usd());
        assert!(!result.has_mixed_currencies);
        // The fast path never touches the provider.
        assert_eq!(provider.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_mixed_currencies_converted() {
        let (provider, aggregator) = setup();
        provider.set_rate(Currency::usd(), Currency::eur(), dec!(1.10));
        let items = vec![usd(dec!(100)), eur(dec!(50))];

        let result = aggregator.aggregate(&items, None).await;

        // Display defaults to the first encountered currency (USD).
        assert_eq!(result.display_currency, Currency::usd());
        assert_eq!(result.total, dec!(155.00));
        assert!(result.has_mixed_currencies);
        assert_eq!(
            result.total_money(),
            Money::new(dec!(155.00), Currency::usd())
        );
    }

    #[tokio::test]
    async fn test_explicit_display_currency() {
        let (provider, aggregator) = setup();
        provider.set_rate(Currency::eur(), Currency::usd(), dec!(0.90));
        let items = vec![usd(dec!(100)), eur(dec!(50))];

        let result = aggregator.aggregate(&items, Some(Currency::eur())).await;

        assert_eq!(result.display_currency, Currency::eur());
        assert_eq!(result.total, dec!(140.00));
        assert!(result.has_mixed_currencies);
    }

    #[tokio::test]
    async fn test_degrades_to_face_value_on_failure() {
        let (provider, aggregator) = setup();
        provider.set_failing(true);
        let items = vec![usd(dec!(100)), eur(dec!(50))];

        let result = aggregator.aggregate(&items, None).await;

        // Never throws; unconverted amounts are summed verbatim and
        // the flag still marks the figure as approximate.
        assert_eq!(result.total, dec!(150));
        assert!(result.has_mixed_currencies);
    }

    #[tokio::test]
    async fn test_single_currency_with_different_display_converts() {
        let (provider, aggregator) = setup();
        provider.set_rate(Currency::eur(), Currency::usd(), dec!(0.90));
        let items = vec![usd(dec!(100)), usd(dec!(100))];

        let result = aggregator.aggregate(&items, Some(Currency::eur())).await;

        assert_eq!(result.display_currency, Currency::eur());
        assert_eq!(result.total, dec!(180.00));
        // One source currency involved, so not mixed.
        assert!(!result.has_mixed_currencies);
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_rounding_to_display_places() {
        let (provider, aggregator) = setup();
        provider.set_rate(Currency::jpy(), Currency::usd(), dec!(151.3333));
        let items = vec![
            PricedItem::new(dec!(10), Currency::jpy()),
            PricedItem::new(dec!(1), Currency::usd()),
        ];

        let result = aggregator.aggregate(&items, Some(Currency::jpy())).await;

        // 1 USD -> 151.3333 JPY rounds to 151 (zero decimal places).
        assert_eq!(result.total, dec!(161));
    }

    #[test]
    fn test_precomputed_bypasses_everything() {
        let result = AggregateTotal::from_precomputed(dec!(1234.56), Currency::gbp());

        assert_eq!(result.total, dec!(1234.56));
        assert_eq!(result.display_currency, Currency::gbp());
        assert!(!result.has_mixed_currencies);
    }

    #[test]
    fn test_priced_item_from_money() {
        let item: PricedItem = Money::new(dec!(42), Currency::usd()).into();
        assert_eq!(item, usd(dec!(42)));
    }
}
