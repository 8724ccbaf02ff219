//! Digger core - service registry and unit-of-work plumbing for the crawler.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **errors**: Centralized error handling and not-found normalization
//! - **infra**: Store connections and the Unit of Work
//! - **registry**: Lazily built service singletons
//! - **services**: Service capability traits and default implementations
//!
//! # Usage
//!
//! ```ignore
//! let connections = Connections::establish(&Config::from_env()).await?;
//! let registry = Arc::new(ServiceRegistry::from_connections(&connections));
//!
//! let affected = registry
//!     .db()?
//!     .execute_batch(vec!["UPDATE task SET status = 2 WHERE id = 7".into()])
//!     .await?;
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod infra;
pub mod registry;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use errors::{normalize_not_found, AppError, AppResult, NotFoundExt, StartupError};
pub use infra::{Connections, Persistence, TransactionContext, UnitOfWork};
pub use registry::{ServiceName, ServiceRegistry};
