//! Lock state machine for services bound to recurring invoice templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use valuesplit_common::{ServiceId, TemplateId};

/// Mutability state of a service's ledger.
///
/// The only transition is `Unlocked -> Locked`, triggered by a
/// successful recurring-template link. The ledger never reverses it;
/// unlinking is an external operation, and a caller that observes an
/// unlock rebuilds the service record from the server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    /// Ledger accepts mutations.
    Unlocked,
    /// Ledger is frozen; every mutation is rejected.
    Locked,
}

impl LockState {
    /// Check whether mutations are allowed in this state.
    pub fn is_mutable(&self) -> bool {
        matches!(self, LockState::Unlocked)
    }
}

impl Default for LockState {
    fn default() -> Self {
        LockState::Unlocked
    }
}

/// Link between a service and a recurring invoice template.
///
/// Creating this record is what drives the `Unlocked -> Locked`
/// transition on the owning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTemplateLink {
    /// The locked service.
    pub service_id: ServiceId,
    /// The recurring invoice template.
    pub template_id: TemplateId,
    /// When the link was created.
    pub linked_at: DateTime<Utc>,
}

impl RecurringTemplateLink {
    /// Create a new template link record.
    pub fn new(service_id: ServiceId, template_id: TemplateId) -> Self {
        Self {
            service_id,
            template_id,
            linked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_unlocked() {
        assert_eq!(LockState::default(), LockState::Unlocked);
        assert!(LockState::default().is_mutable());
    }

    #[test]
    fn test_locked_is_not_mutable() {
        assert!(!LockState::Locked.is_mutable());
    }
}
