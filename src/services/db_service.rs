//! Db service - raw access to the relational store.
//!
//! Writes go through the unit of work so a batch either lands whole or not
//! at all. Scalar reads treat "no row" as absence rather than failure.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, QueryResult, Statement};
use std::sync::Arc;

use crate::errors::{AppResult, NotFoundExt};
use crate::infra::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Db service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DbService: Send + Sync {
    /// Round-trip check against the store
    async fn ping(&self) -> AppResult<()>;

    /// Run all statements in one transaction, returning total affected rows
    async fn execute_batch(&self, statements: Vec<String>) -> AppResult<u64>;

    /// First column of the first row, or `None` when the query matches nothing
    async fn fetch_scalar(&self, sql: String) -> AppResult<Option<i64>>;

    /// The shared unit of work, for callers composing their own transactions
    fn persistence(&self) -> Arc<Persistence>;
}

/// Concrete implementation of DbService using Unit of Work.
pub struct DbManager {
    persistence: Arc<Persistence>,
}

impl DbManager {
    pub fn new(persistence: Arc<Persistence>) -> Self {
        Self { persistence }
    }

    async fn first_row(&self, sql: String) -> AppResult<QueryResult> {
        let db = self.persistence.connection();
        let row = db
            .query_one(Statement::from_string(db.get_database_backend(), sql.clone()))
            .await?
            .ok_or(DbErr::RecordNotFound(sql))?;
        Ok(row)
    }
}

#[async_trait]
impl DbService for DbManager {
    async fn ping(&self) -> AppResult<()> {
        let db = self.persistence.connection();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            crate::config::DB_PING_QUERY.to_string(),
        ))
        .await?;
        Ok(())
    }

    async fn execute_batch(&self, statements: Vec<String>) -> AppResult<u64> {
        let persistence = &self.persistence;
        crate::with_transaction!(persistence, |ctx| {
            let mut affected = 0;
            for sql in &statements {
                affected += ctx.execute(sql).await?;
            }
            Ok(affected)
        })
    }

    async fn fetch_scalar(&self, sql: String) -> AppResult<Option<i64>> {
        match self.first_row(sql).await.optional()? {
            Some(row) => Ok(Some(row.try_get_by_index::<i64>(0)?)),
            None => Ok(None),
        }
    }

    fn persistence(&self) -> Arc<Persistence> {
        self.persistence.clone()
    }
}
