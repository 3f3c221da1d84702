//! Storage schema bootstrap.
//!
//! Three relations: `accounts`, the append-only `transactions` ledger, and
//! the mutable `balances` cache. Integrity constraints live in the database
//! so they hold no matter which client writes.

use sqlx::PgPool;

use crate::Result;

/// Account identity. Names need not be unique.
pub const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    account_id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL
)
"#;

/// Append-only transfer ledger; the durable source of truth.
pub const CREATE_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id BIGSERIAL PRIMARY KEY,
    debit_account_id BIGINT NOT NULL REFERENCES accounts (account_id),
    credit_account_id BIGINT NOT NULL REFERENCES accounts (account_id),
    amount NUMERIC(10, 2) NOT NULL CHECK (amount > 0),
    CHECK (debit_account_id <> credit_account_id)
)
"#;

/// Denormalized balance cache, one row per account, maintained
/// transactionally alongside each transactions insert.
pub const CREATE_BALANCES: &str = r#"
CREATE TABLE IF NOT EXISTS balances (
    account_id BIGINT PRIMARY KEY REFERENCES accounts (account_id),
    balance NUMERIC(10, 2) NOT NULL
)
"#;

/// Create all ledger tables if they do not exist.
pub async fn init(pool: &PgPool) -> Result<()> {
    for statement in [CREATE_ACCOUNTS, CREATE_TRANSACTIONS, CREATE_BALANCES] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Drop all ledger tables. Test support only.
pub async fn drop_all(pool: &PgPool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS balances, transactions, accounts CASCADE")
        .execute(pool)
        .await?;
    Ok(())
}
