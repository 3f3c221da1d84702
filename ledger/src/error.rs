//! Error types for ledger operations.

use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Invalid input, rejected before any statement executes.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Storage-level constraint failure (NOT NULL, CHECK, FOREIGN KEY, or a
    /// missing balance row). The unit of work is rolled back by the store.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transient conflict between concurrent units of work: deadlock victim
    /// selection or a serialization failure. Absorbed by the retry loop.
    #[error("serialization conflict: {0}")]
    Serialization(String),

    /// The retry budget was spent on serialization conflicts.
    #[error("transfer aborted after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },

    /// Connection dropped or pool exhausted mid-operation. The store rolls
    /// back any uncommitted work on its own.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Residual database error.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl LedgerError {
    /// Check if this error is transient and safe to retry.
    ///
    /// Only a known-aborted conflict qualifies; everything else (including
    /// an ambiguous connection loss) must surface to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Serialization(_))
    }
}

// SQLSTATE 40001 is serialization_failure, 40P01 is deadlock_detected;
// class 23 covers integrity constraint violations.
impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned());
                match code.as_deref() {
                    Some("40001") | Some("40P01") => {
                        LedgerError::Serialization(db.message().to_string())
                    }
                    Some(c) if c.starts_with("23") => {
                        LedgerError::ConstraintViolation(db.message().to_string())
                    }
                    _ => LedgerError::Database(sqlx::Error::Database(db)),
                }
            }
            sqlx::Error::Io(io) => LedgerError::ConnectionLost(io.to_string()),
            sqlx::Error::PoolTimedOut => {
                LedgerError::ConnectionLost("connection pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => {
                LedgerError::ConnectionLost("connection pool closed".to_string())
            }
            other => LedgerError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_serialization_is_retryable() {
        assert!(LedgerError::Serialization("deadlock detected".into()).is_retryable());

        assert!(!LedgerError::Validation("same account".into()).is_retryable());
        assert!(!LedgerError::ConstraintViolation("fk".into()).is_retryable());
        assert!(!LedgerError::ConnectionLost("broken pipe".into()).is_retryable());
        assert!(!LedgerError::RetriesExhausted { attempts: 10 }.is_retryable());
    }

    #[test]
    fn test_pool_errors_map_to_connection_lost() {
        let e = LedgerError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(e, LedgerError::ConnectionLost(_)));

        let e = LedgerError::from(sqlx::Error::PoolClosed);
        assert!(matches!(e, LedgerError::ConnectionLost(_)));
    }

    #[test]
    fn test_row_not_found_stays_database() {
        let e = LedgerError::from(sqlx::Error::RowNotFound);
        assert!(matches!(e, LedgerError::Database(_)));
    }
}
