//! Summa Common Types
//!
//! Shared types used across the Summa ledger workspace: surrogate-key
//! identifiers and monetary validation helpers.

pub mod identifiers;
pub mod monetary;

pub use identifiers::*;
pub use monetary::*;
