//! Service balance computation.
//!
//! All balance arithmetic lives here so every call site shares one
//! invariant-checked implementation instead of re-deriving it ad hoc.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationKind, Attribution, InvoiceLink};
use crate::service::Service;

/// Computed allocation state of a single service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBalance {
    /// Sum of all attribution amounts.
    pub total_attributed: Decimal,
    /// Sum of all invoice link amounts.
    pub total_invoiced: Decimal,
    /// `price - total_attributed - total_invoiced`.
    pub amount_remaining: Decimal,
    /// Consumed fraction of the price, as a percentage. Unrounded and
    /// uncapped; use [`consumed_percent_display`] for UI purposes.
    ///
    /// [`consumed_percent_display`]: ServiceBalance::consumed_percent_display
    pub consumed_percent: Decimal,
}

impl ServiceBalance {
    /// Compute the balance for a service from its allocations.
    ///
    /// Pure function: no side effects, no I/O. Callers must recompute
    /// from fresh data before validating a new mutation.
    pub fn compute(
        service: &Service,
        attributions: &[Attribution],
        invoice_links: &[InvoiceLink],
    ) -> Self {
        let total_attributed: Decimal = attributions.iter().map(|a| a.amount).sum();
        let total_invoiced: Decimal = invoice_links.iter().map(|l| l.amount).sum();

        Self::from_totals(service.price, total_attributed, total_invoiced)
    }

    /// Build a balance from already-summed totals.
    pub fn from_totals(price: Decimal, total_attributed: Decimal, total_invoiced: Decimal) -> Self {
        let consumed = total_attributed + total_invoiced;
        let consumed_percent = if price.is_zero() {
            Decimal::ZERO
        } else {
            consumed / price * Decimal::ONE_HUNDRED
        };

        Self {
            total_attributed,
            total_invoiced,
            amount_remaining: price - consumed,
            consumed_percent,
        }
    }

    /// Total amount consumed so far.
    pub fn consumed(&self) -> Decimal {
        self.total_attributed + self.total_invoiced
    }

    /// Consumed percentage capped at 100 for display.
    pub fn consumed_percent_display(&self) -> Decimal {
        self.consumed_percent.min(Decimal::ONE_HUNDRED)
    }

    /// Check whether the non-exceedance invariant holds against a price:
    /// `0 <= amount_remaining <= price`.
    pub fn is_consistent(&self, price: Decimal) -> bool {
        self.amount_remaining >= Decimal::ZERO && self.amount_remaining <= price
    }

    /// The balance that would result from adding an allocation.
    /// Arithmetic only; validation belongs to the ledger engine.
    pub fn with_allocation(&self, kind: AllocationKind, amount: Decimal, price: Decimal) -> Self {
        let (attributed, invoiced) = match kind {
            AllocationKind::Attribution => (self.total_attributed + amount, self.total_invoiced),
            AllocationKind::Invoice => (self.total_attributed, self.total_invoiced + amount),
        };
        Self::from_totals(price, attributed, invoiced)
    }
}
