//! Allocation records: attributions and invoice links.
//!
//! Both kinds consume part of the owning service's price. They are
//! owned exclusively by their service and deleted independently by the
//! user; deletion is always safe (it only increases the remaining
//! balance) unless the service is locked.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use valuesplit_common::{AllocationId, ContactId, InvoiceId, ServiceId};

/// Which side of the ledger an allocation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationKind {
    /// Partial credit of the service's value to another contact.
    Attribution,
    /// Partial or full billing event against the service.
    Invoice,
}

/// A partial credit of a service's value assigned to another contact,
/// for split-billing purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Unique allocation ID.
    pub id: AllocationId,
    /// Owning service.
    pub service_id: ServiceId,
    /// Amount consumed (positive, at most the remaining balance at creation).
    pub amount: Decimal,
    /// Contact receiving the credit.
    pub target_contact_id: ContactId,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// When the attribution was recorded.
    pub attributed_at: DateTime<Utc>,
}

impl Attribution {
    /// Create a new attribution record.
    pub fn new(service_id: ServiceId, amount: Decimal, target_contact_id: ContactId) -> Self {
        Self {
            id: AllocationId::new(),
            service_id,
            amount,
            target_contact_id,
            notes: None,
            attributed_at: Utc::now(),
        }
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A partial or full association between a service and a billing
/// event. `invoice_id` is optional: an amount can be recorded as
/// invoiced without linking a concrete invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLink {
    /// Unique allocation ID.
    pub id: AllocationId,
    /// Owning service.
    pub service_id: ServiceId,
    /// Amount consumed (positive, at most the remaining balance at creation).
    pub amount: Decimal,
    /// Invoice reference, if the billing event was linked.
    pub invoice_id: Option<InvoiceId>,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// When the amount was invoiced.
    pub invoiced_at: DateTime<Utc>,
}

impl InvoiceLink {
    /// Record an invoiced amount without a concrete invoice reference.
    pub fn new(service_id: ServiceId, amount: Decimal) -> Self {
        Self {
            id: AllocationId::new(),
            service_id,
            amount,
            invoice_id: None,
            notes: None,
            invoiced_at: Utc::now(),
        }
    }

    /// Link a concrete invoice.
    pub fn with_invoice(mut self, invoice_id: InvoiceId) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
