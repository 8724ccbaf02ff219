//! Unit of Work pattern implementation.
//!
//! Runs a caller-supplied block of persistence work inside one database
//! transaction:
//! - Ok from the work commits; a failed commit is rolled back and its error returned
//! - Err from the work rolls back and returns that same error
//! - a panic inside the work is caught here, rolled back and returned as
//!   `AppError::Aborted`, so the calling task keeps running
//!
//! Rollback failures are logged and never replace the triggering error.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};

use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not object safe due to generic methods.
/// For testing, substitute the connection (e.g. an in-memory store) instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Execute a closure within a transaction.
    ///
    /// Uses ReadCommitted isolation, read-write access.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send;

    /// Execute a closure within a transaction with serializable isolation.
    ///
    /// Use this for operations requiring the strongest consistency guarantees.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send;
}

/// Lifecycle of a single transaction. `Committed` and `RolledBack` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Active,
    Committed,
    RolledBack,
}

impl TxState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxState::Active => "active",
            TxState::Committed => "committed",
            TxState::RolledBack => "rolled_back",
        }
    }
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction context handed to the unit of work.
///
/// Everything run through it belongs to the same database transaction. The
/// context borrows the transaction, so it cannot escape the call.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// The open transaction, usable anywhere sea-orm accepts a connection.
    pub fn connection(&self) -> &'a DatabaseTransaction {
        self.txn
    }

    /// Run a raw statement and return the number of affected rows.
    pub async fn execute(&self, sql: &str) -> AppResult<u64> {
        let result = self.txn.execute_unprepared(sql).await?;
        Ok(result.rows_affected())
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await?;
        tracing::debug!(state = %TxState::Active, ?isolation, "transaction started");

        let outcome = run_guarded(&txn, f).await;

        match outcome {
            Ok(value) => match txn.commit().await {
                Ok(()) => {
                    tracing::debug!(state = %TxState::Committed, "transaction finished");
                    Ok(value)
                }
                Err(e) => {
                    // `commit` consumed the handle, so the rollback happens in its
                    // `Drop` and a failure there cannot be observed or logged here.
                    tracing::debug!("rollback tx due to: {}", e);
                    tracing::debug!(state = %TxState::RolledBack, "transaction finished");
                    Err(AppError::Database(e))
                }
            },
            Err(e) => {
                rollback(txn, &e).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}

/// Run the work, turning a panic (while building or polling its future)
/// into `AppError::Aborted`.
async fn run_guarded<F, T>(txn: &DatabaseTransaction, f: F) -> AppResult<T>
where
    F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
    T: Send,
{
    let work = match panic::catch_unwind(AssertUnwindSafe(|| f(TransactionContext::new(txn)))) {
        Ok(work) => work,
        Err(payload) => return Err(aborted(payload)),
    };

    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(aborted(payload)),
    }
}

async fn rollback(txn: DatabaseTransaction, cause: &AppError) {
    tracing::debug!("rollback tx due to: {}", cause);
    match txn.rollback().await {
        Ok(()) => tracing::debug!(state = %TxState::RolledBack, "transaction finished"),
        Err(e) => tracing::error!("Transaction rollback failed: {}", e),
    }
}

fn aborted(payload: Box<dyn Any + Send>) -> AppError {
    let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unit of work panicked".to_string()
    };
    AppError::Aborted(message)
}

/// Simpler API for executing transactional operations.
///
/// This helper macro reduces boilerplate when using transactions.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_keeps_panic_message() {
        let err = aborted(Box::new("boom"));
        assert!(matches!(err, AppError::Aborted(ref msg) if msg == "boom"));

        let err = aborted(Box::new(String::from("index out of range")));
        assert_eq!(err.to_string(), "Unit of work aborted: index out of range");

        let err = aborted(Box::new(42_u8));
        assert!(matches!(err, AppError::Aborted(ref msg) if msg == "unit of work panicked"));
    }

    #[test]
    fn test_tx_state_display() {
        assert_eq!(TxState::Active.to_string(), "active");
        assert_eq!(TxState::RolledBack.to_string(), "rolled_back");
    }
}
