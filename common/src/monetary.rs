//! Monetary types for the ValueSplit allocation ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount with currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount value (high precision decimal).
    pub value: Decimal,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Round to the currency's standard decimal places.
    pub fn round(&self) -> Self {
        let places = self.currency.decimal_places();
        Self {
            value: self.value.round_dp(places),
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Error when attempting operations on different currencies.
#[derive(Debug, Clone)]
pub struct CurrencyMismatchError {
    pub expected: Currency,
    pub actual: Currency,
}

impl fmt::Display for CurrencyMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Currency mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for CurrencyMismatchError {}

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get the standard decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" => 0,
            "BHD" | "KWD" | "OMR" => 3,
            _ => 2,
        }
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A currency pair for rate lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency (the one being converted from).
    pub base: Currency,
    /// Quote currency (the one being converted into).
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Exchange rate between two currencies.
///
/// One unit of `pair.base` buys `rate` units of `pair.quote`. Rates
/// carry no expiry: within a session a fetched rate is treated as
/// current enough for display purposes, not for settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// The currency pair.
    pub pair: CurrencyPair,
    /// The conversion multiplier (positive).
    pub rate: Decimal,
    /// When this rate was fetched from the provider.
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// Create a new exchange rate fetched now.
    pub fn new(pair: CurrencyPair, rate: Decimal) -> Self {
        Self {
            pair,
            rate,
            fetched_at: Utc::now(),
        }
    }

    /// Convert an amount using this rate, rounding to the quote
    /// currency's decimal places.
    pub fn convert(&self, amount: &Money) -> Result<Money, CurrencyMismatchError> {
        if amount.currency != self.pair.base {
            return Err(CurrencyMismatchError {
                expected: self.pair.base.clone(),
                actual: amount.currency.clone(),
            });
        }

        Ok(Money::new(amount.value * self.rate, self.pair.quote.clone()).round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_round_to_currency_places() {
        let usd = Money::new(dec!(10.456), Currency::usd()).round();
        assert_eq!(usd.value, dec!(10.46));

        let jpy = Money::new(dec!(151.4), Currency::jpy()).round();
        assert_eq!(jpy.value, dec!(151));
    }

    #[test]
    fn test_exchange_rate_conversion() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        let rate = ExchangeRate::new(pair, dec!(0.92));

        let usd = Money::new(dec!(1000), Currency::usd());
        let eur = rate.convert(&usd).unwrap();

        assert_eq!(eur.currency, Currency::eur());
        assert_eq!(eur.value, Decimal::from(920));
    }

    #[test]
    fn test_exchange_rate_wrong_base() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        let rate = ExchangeRate::new(pair, dec!(0.92));

        let gbp = Money::new(dec!(100), Currency::gbp());
        assert!(rate.convert(&gbp).is_err());
    }

    #[test]
    fn test_currency_decimal_places() {
        assert_eq!(Currency::usd().decimal_places(), 2);
        assert_eq!(Currency::eur().decimal_places(), 2);
        assert_eq!(Currency::jpy().decimal_places(), 0);
    }

    #[test]
    fn test_currency_uppercased() {
        assert_eq!(Currency::new("usd"), Currency::usd());
    }
}
