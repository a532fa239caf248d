//! ValueSplit Common Types
//!
//! Shared types used across the ValueSplit allocation ledger:
//! entity identifiers and monetary primitives.

pub mod identifiers;
pub mod monetary;

pub use identifiers::*;
pub use monetary::*;
