//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Relational store connection (Postgres via sea-orm)
//! - Cache store connection (Redis)
//! - Unit of Work for transaction management

pub mod cache;
pub mod connections;
pub mod db;
pub mod unit_of_work;

pub use cache::{Cache, CacheEndpoint};
pub use connections::Connections;
pub use db::Database;
pub use unit_of_work::{Persistence, TransactionContext, TxState, UnitOfWork};
