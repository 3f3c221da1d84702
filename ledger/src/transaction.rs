//! Committed transfer records from the transactions ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use summa_common::{AccountId, TransactionId};

/// A committed transfer: one debit and one credit of the same amount.
///
/// Rows are append-only; a `Transfer` read back from the store never
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transfer {
    /// Surrogate key of the ledger row.
    pub transaction_id: i64,
    /// Account whose balance was decreased.
    pub debit_account_id: i64,
    /// Account whose balance was increased.
    pub credit_account_id: i64,
    /// Amount moved; strictly positive.
    pub amount: Decimal,
}

impl Transfer {
    /// Ledger row identifier.
    pub fn id(&self) -> TransactionId {
        TransactionId::from_raw(self.transaction_id)
    }

    /// Debited account.
    pub fn debit_account(&self) -> AccountId {
        AccountId::from_raw(self.debit_account_id)
    }

    /// Credited account.
    pub fn credit_account(&self) -> AccountId {
        AccountId::from_raw(self.credit_account_id)
    }

    /// Signed effect of this transfer on the given account's balance.
    pub fn delta_for(&self, account: AccountId) -> Decimal {
        if account.as_i64() == self.credit_account_id {
            self.amount
        } else if account.as_i64() == self.debit_account_id {
            -self.amount
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_conserves_sum() {
        let transfer = Transfer {
            transaction_id: 1,
            debit_account_id: 10,
            credit_account_id: 20,
            amount: Decimal::from_str_exact("50.00").unwrap(),
        };

        let debit = transfer.delta_for(AccountId::from_raw(10));
        let credit = transfer.delta_for(AccountId::from_raw(20));
        let other = transfer.delta_for(AccountId::from_raw(30));

        assert_eq!(debit + credit, Decimal::ZERO);
        assert_eq!(credit, Decimal::from_str_exact("50.00").unwrap());
        assert_eq!(other, Decimal::ZERO);
    }
}
