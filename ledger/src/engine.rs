//! Ledger validation engine.
//!
//! Stateless checks over a service and its freshly computed balance.
//! The engine enforces "reject anything invalid given the data you
//! were given"; global serializability against concurrent writers is
//! the backend's concern. Callers must recompute the balance before
//! validating, and must not treat a validated allocation as committed
//! until the external write succeeds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::allocation::AllocationKind;
use crate::balance::ServiceBalance;
use crate::error::{AllocationError, LedgerResult};
use crate::service::Service;

/// Quick-select percentage shortcuts for partial invoicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickPercent {
    /// 25% of the remaining balance.
    Quarter,
    /// 50% of the remaining balance.
    Half,
    /// 75% of the remaining balance.
    ThreeQuarters,
    /// 100% of the remaining balance.
    Full,
}

impl QuickPercent {
    /// The percentage as a decimal in (0, 100].
    pub fn as_decimal(&self) -> Decimal {
        match self {
            QuickPercent::Quarter => Decimal::from(25),
            QuickPercent::Half => Decimal::from(50),
            QuickPercent::ThreeQuarters => Decimal::from(75),
            QuickPercent::Full => Decimal::ONE_HUNDRED,
        }
    }
}

/// Validation engine for ledger mutations.
pub struct LedgerEngine;

impl LedgerEngine {
    /// Create a new ledger engine.
    pub fn new() -> Self {
        Self
    }

    /// Validate a proposed attribution or invoice link amount against
    /// the current balance.
    ///
    /// The lock check comes first so a locked service fails fast
    /// regardless of the amount.
    #[instrument(skip(self, service, balance), fields(service_id = %service.id))]
    pub fn validate_new_allocation(
        &self,
        service: &Service,
        balance: &ServiceBalance,
        proposed: Decimal,
    ) -> LedgerResult<()> {
        if service.is_locked() {
            return Err(AllocationError::ServiceLocked(service.id));
        }

        if proposed <= Decimal::ZERO {
            return Err(AllocationError::NonPositiveAmount { amount: proposed });
        }

        if proposed > balance.amount_remaining {
            return Err(AllocationError::ExceedsRemaining {
                requested: proposed,
                remaining: balance.amount_remaining,
            });
        }

        debug!(
            amount = %proposed,
            remaining = %balance.amount_remaining,
            "Allocation validated"
        );

        Ok(())
    }

    /// Validate removing an existing allocation.
    ///
    /// Removal only increases the remaining balance, so it is always
    /// safe while the service is unlocked.
    pub fn validate_allocation_removal(&self, service: &Service) -> LedgerResult<()> {
        if service.is_locked() {
            return Err(AllocationError::ServiceLocked(service.id));
        }
        Ok(())
    }

    /// Validate a proposed price change.
    ///
    /// The price may never drop below the consumed total, which would
    /// drive the remaining balance negative.
    #[instrument(skip(self, service, balance), fields(service_id = %service.id))]
    pub fn validate_price_change(
        &self,
        service: &Service,
        balance: &ServiceBalance,
        new_price: Decimal,
    ) -> LedgerResult<()> {
        if service.is_locked() {
            return Err(AllocationError::ServiceLocked(service.id));
        }

        if new_price < Decimal::ZERO {
            return Err(AllocationError::NegativePrice { price: new_price });
        }

        let consumed = balance.consumed();
        if new_price < consumed {
            return Err(AllocationError::PriceBelowConsumed {
                requested: new_price,
                consumed,
            });
        }

        Ok(())
    }

    /// Validate an allocation and return the balance it would produce.
    ///
    /// Lets the UI show "After: $X" before committing, without
    /// duplicating the arithmetic. The returned balance is a local
    /// projection; it becomes authoritative only once the external
    /// write succeeds and the balance is recomputed from server data.
    pub fn preview_allocation(
        &self,
        service: &Service,
        balance: &ServiceBalance,
        kind: AllocationKind,
        proposed: Decimal,
    ) -> LedgerResult<ServiceBalance> {
        self.validate_new_allocation(service, balance, proposed)?;
        Ok(balance.with_allocation(kind, proposed, service.price))
    }

    /// Compute the invoice amount for a percentage of the *remaining*
    /// balance, rounded to 2 decimal places.
    ///
    /// The base is deliberately the remaining balance rather than the
    /// original price, so repeated partial invoicing composes without
    /// ever exceeding the total.
    pub fn invoice_amount_for_percent(
        &self,
        balance: &ServiceBalance,
        percent: Decimal,
    ) -> LedgerResult<Decimal> {
        if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(AllocationError::InvalidPercent { percent });
        }

        Ok((percent / Decimal::ONE_HUNDRED * balance.amount_remaining).round_dp(2))
    }

    /// Quick-select variant of [`invoice_amount_for_percent`].
    ///
    /// [`invoice_amount_for_percent`]: LedgerEngine::invoice_amount_for_percent
    pub fn quick_invoice_amount(
        &self,
        balance: &ServiceBalance,
        quick: QuickPercent,
    ) -> LedgerResult<Decimal> {
        self.invoice_amount_for_percent(balance, quick.as_decimal())
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}
