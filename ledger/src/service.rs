//! Sellable service definitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use valuesplit_common::{Currency, Money, ServiceId, TemplateId};

use crate::error::{AllocationError, LedgerResult};
use crate::lock::{LockState, RecurringTemplateLink};

/// A sellable service with a fixed price that allocations consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique service identifier.
    pub id: ServiceId,
    /// Service name/description.
    pub name: String,
    /// Fixed price (non-negative).
    pub price: Decimal,
    /// Currency the price is denominated in.
    pub currency: Currency,
    /// Lock state; `Locked` once bound to a recurring template.
    pub lock: LockState,
    /// When the service was created.
    pub created_at: DateTime<Utc>,
    /// When the service was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Create a new unlocked service.
    ///
    /// The price must be non-negative; service creation goes through
    /// external CRUD which rejects negative prices before they reach
    /// the ledger.
    pub fn new(name: impl Into<String>, price: Decimal, currency: Currency) -> Self {
        debug_assert!(
            price >= Decimal::ZERO,
            "service price must be non-negative, got {price}"
        );
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            name: name.into(),
            price,
            currency,
            lock: LockState::Unlocked,
            created_at: now,
            updated_at: now,
        }
    }

    /// The service price as a typed amount.
    pub fn price_money(&self) -> Money {
        Money::new(self.price, self.currency.clone())
    }

    /// Check whether the service is locked to a recurring template.
    pub fn is_locked(&self) -> bool {
        self.lock == LockState::Locked
    }

    /// Single source of truth for every edit surface: the service
    /// itself, its attributions, and its invoice links are editable
    /// only while unlocked.
    pub fn is_mutable(&self) -> bool {
        self.lock.is_mutable()
    }

    /// Bind the service to a recurring invoice template, freezing its
    /// ledger. Callers must invoke this only after the external
    /// linking call succeeded; on external failure the state stays
    /// unchanged.
    pub fn link_recurring_template(
        &mut self,
        template_id: TemplateId,
    ) -> LedgerResult<RecurringTemplateLink> {
        if self.is_locked() {
            return Err(AllocationError::ServiceLocked(self.id));
        }

        self.lock = LockState::Locked;
        self.updated_at = Utc::now();

        info!(
            service_id = %self.id,
            template_id = %template_id,
            "Service locked to recurring template"
        );

        Ok(RecurringTemplateLink::new(self.id, template_id))
    }
}
