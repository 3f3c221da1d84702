//! Summa Ledger Engine
//!
//! Double-entry ledger over PostgreSQL. The `transactions` table is the
//! append-only system of record; `balances` is a denormalized cache updated
//! in the same transaction as each transfer, so reads stay O(1) while the
//! invariant `sum(balance) == 0` holds whenever no transfer is in flight.

pub mod engine;
pub mod error;
pub mod retry;
pub mod schema;
pub mod transaction;


pub use engine::{Ledger, LockStrategy};
pub use error::LedgerError;
pub use retry::RetryPolicy;
pub use transaction::Transfer;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
