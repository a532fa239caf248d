//! ValueSplit Allocation Ledger
//!
//! Tracks how much of a service's fixed price has been consumed by
//! attributions to other contacts and by invoice links, and enforces
//! the non-exceedance invariant on every proposed mutation:
//!
//! `0 <= amount_remaining <= price` at all times.
//!
//! All computations are pure and synchronous; persistence of the
//! records lives with external collaborators. Validation is separated
//! from computation so callers can preview an allocation before
//! committing it.

pub mod allocation;
pub mod balance;
pub mod engine;
pub mod error;
pub mod lock;
pub mod service;

pub use allocation::{AllocationKind, Attribution, InvoiceLink};
pub use balance::ServiceBalance;
pub use engine::{LedgerEngine, QuickPercent};
pub use error::{AllocationError, LedgerResult};
pub use lock::{LockState, RecurringTemplateLink};
pub use service::Service;
