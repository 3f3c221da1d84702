//! Core ledger engine implementation.

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use tracing::{debug, info, instrument, warn};

use summa_common::{is_valid_amount, AccountId, TransactionId, MONEY_SCALE};

use crate::error::LedgerError;
use crate::retry::RetryPolicy;
use crate::transaction::Transfer;
use crate::Result;

/// Locking granularity used to serialize concurrent balance mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockStrategy {
    /// Lock only the two balance rows being read-then-written, via
    /// `SELECT ... FOR UPDATE`. Disjoint transfers proceed concurrently;
    /// overlapping ones serialize on the row locks and may deadlock, which
    /// the retry loop absorbs.
    #[default]
    RowLevel,
    /// Exclusive lock on the whole balances table before any read. Correct
    /// but serializes every transfer system-wide; kept as the baseline the
    /// row-level strategy is measured against.
    TableExclusive,
}

/// The ledger engine: double-entry bookkeeping over PostgreSQL.
///
/// The sole configuration input is a database connection URL. Cloning is
/// cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
    locking: LockStrategy,
    retry: RetryPolicy,
}

impl Ledger {
    /// Connect to the database at `url` with default locking and retry.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(16).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Build a ledger over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            locking: LockStrategy::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Select the locking strategy.
    pub fn with_lock_strategy(mut self, locking: LockStrategy) -> Self {
        self.locking = locking;
        self
    }

    /// Select the conflict retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create an account with a zero balance.
    ///
    /// Both the `accounts` row and its `balances` row are inserted in one
    /// transaction: either both exist afterwards or neither does.
    #[instrument(skip(self))]
    pub async fn create_account(&self, name: &str) -> Result<AccountId> {
        if name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "account name must be non-empty".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let (account_id,): (i64,) =
            sqlx::query_as("INSERT INTO accounts (name) VALUES ($1) RETURNING account_id")
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("INSERT INTO balances (account_id, balance) VALUES ($1, 0)")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(account_id, name, "account created");
        Ok(AccountId::from_raw(account_id))
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// One atomic unit of work: lock the two balance rows, read both
    /// balances, append the transactions row, write both updated balances.
    /// A deadlock or serialization abort restarts the whole unit of work
    /// under the retry policy; no other error is retried. Not idempotent:
    /// the retry only fires after a known abort, never after an ambiguous
    /// outcome.
    #[instrument(skip(self))]
    pub async fn transfer_funds(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransactionId> {
        if from == to {
            return Err(LedgerError::Validation(format!(
                "cannot transfer from account {from} to itself"
            )));
        }
        if !is_valid_amount(amount) {
            return Err(LedgerError::Validation(format!(
                "amount must be positive with at most {MONEY_SCALE} decimal places, got {amount}"
            )));
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_transfer(from, to, amount).await {
                Ok(transaction_id) => {
                    debug!(%transaction_id, attempt, "transfer committed");
                    return Ok(transaction_id);
                }
                Err(e) if e.is_retryable() => {
                    if attempt >= self.retry.max_attempts {
                        warn!(%from, %to, attempt, "retry budget exhausted");
                        return Err(LedgerError::RetriesExhausted { attempts: attempt });
                    }
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        %from,
                        %to,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transfer aborted by lock conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One attempt at the transfer unit of work.
    async fn try_transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<TransactionId> {
        let mut tx = self.pool.begin().await?;

        if self.locking == LockStrategy::TableExclusive {
            sqlx::query("LOCK TABLE balances IN ACCESS EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;
        }

        // Lock-and-read in caller order, debit side first. Opposite-order
        // callers on the same pair can deadlock here; Postgres aborts one
        // victim and the retry loop restarts it.
        let from_balance = self.lock_balance(&mut tx, from).await?;
        let to_balance = self.lock_balance(&mut tx, to).await?;

        let (transaction_id,): (i64,) = sqlx::query_as(
            "INSERT INTO transactions (debit_account_id, credit_account_id, amount) \
             VALUES ($1, $2, $3) RETURNING transaction_id",
        )
        .bind(from.as_i64())
        .bind(to.as_i64())
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE balances SET balance = $1 WHERE account_id = $2")
            .bind(from_balance - amount)
            .bind(from.as_i64())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE balances SET balance = $1 WHERE account_id = $2")
            .bind(to_balance + amount)
            .bind(to.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(TransactionId::from_raw(transaction_id))
    }

    /// Read one balance row inside the transfer transaction, locking it
    /// against concurrent read-modify-write when the strategy is row-level.
    async fn lock_balance(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        account: AccountId,
    ) -> Result<Decimal> {
        let sql = match self.locking {
            LockStrategy::RowLevel => {
                "SELECT balance FROM balances WHERE account_id = $1 FOR UPDATE"
            }
            // The table lock already serializes; a plain read suffices.
            LockStrategy::TableExclusive => "SELECT balance FROM balances WHERE account_id = $1",
        };

        let row: Option<(Decimal,)> = sqlx::query_as(sql)
            .bind(account.as_i64())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|(balance,)| balance).ok_or_else(|| {
            LedgerError::ConstraintViolation(format!("account {account} has no balance row"))
        })
    }

    /// Current cached balance of an account. O(1); never recomputed from
    /// the transactions ledger.
    pub async fn balance(&self, account: AccountId) -> Result<Decimal> {
        let row: Option<(Decimal,)> =
            sqlx::query_as("SELECT balance FROM balances WHERE account_id = $1")
                .bind(account.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(balance,)| balance).ok_or_else(|| {
            LedgerError::ConstraintViolation(format!("account {account} has no balance row"))
        })
    }

    /// Sum of all cached balances. The double-entry invariant makes this
    /// exactly zero whenever no transfer is in flight.
    pub async fn balance_total(&self) -> Result<Decimal> {
        let (total,): (Decimal,) =
            sqlx::query_as("SELECT COALESCE(SUM(balance), 0) FROM balances")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    /// All account ids, oldest first.
    pub async fn account_ids(&self) -> Result<Vec<AccountId>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT account_id FROM accounts ORDER BY account_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| AccountId::from_raw(id)).collect())
    }

    /// Committed transfers touching an account, oldest first.
    pub async fn transfers_touching(&self, account: AccountId) -> Result<Vec<Transfer>> {
        let transfers = sqlx::query_as::<_, Transfer>(
            "SELECT transaction_id, debit_account_id, credit_account_id, amount \
             FROM transactions \
             WHERE debit_account_id = $1 OR credit_account_id = $1 \
             ORDER BY transaction_id",
        )
        .bind(account.as_i64())
        .fetch_all(&self.pool)
        .await?;
        Ok(transfers)
    }
}
