//! Process-wide store handles.
//!
//! Both stores are established once, before the registry is built, and then
//! shared by cloning; the clones point at the same pools.

use crate::config::Config;
use crate::errors::StartupError;

use super::{Cache, Database};

#[derive(Clone)]
pub struct Connections {
    database: Database,
    cache: Cache,
}

impl Connections {
    /// Connect to the relational store, then to the cache store.
    ///
    /// Any error here is fatal for the process; callers are expected to exit.
    pub async fn establish(config: &Config) -> Result<Self, StartupError> {
        let database = Database::connect(&config.database).await?;
        let cache = Cache::connect(&config.cache).await?;

        Ok(Self::new(database, cache))
    }

    pub fn new(database: Database, cache: Cache) -> Self {
        Self { database, cache }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}
