//! Database connection and initialization.

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};

use crate::config::{DatabaseConfig, DB_PING_QUERY};
use crate::errors::StartupError;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the connection pool and verify the store answers.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StartupError> {
        let mut options = ConnectOptions::new(config.url.as_str());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout());

        let connection = SeaDatabase::connect(options).await?;
        let database = Self { connection };
        database.ping().await?;

        tracing::info!(
            backend = ?database.connection.get_database_backend(),
            "Database connected"
        );

        Ok(database)
    }

    /// Wrap an already established connection (e.g. a mock or in-memory store).
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                DB_PING_QUERY.to_string(),
            ))
            .await?;
        Ok(())
    }
}
