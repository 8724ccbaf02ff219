//! Application services layer.
//!
//! Every service the registry hands out implements one of the capability
//! traits below. Writes go through the Unit of Work for transaction
//! management.

mod cache_service;
mod catalog;
mod db_service;

use std::sync::Arc;

use crate::infra::{Cache, Persistence};
use crate::registry::ServiceName;

pub use cache_service::{CacheService, InMemoryCache};
pub use catalog::{
    ConfigManager, ConfigService, PluginManager, PluginService, ProjectConfigManager,
    ProjectConfigService, ProjectManager, ProjectService, ProxyManager, ProxyService,
    PushSourceManager, PushSourceService, QueueManager, QueueService, ResultManager,
    ResultService, StatisticManager, StatisticService, TaskManager, TaskService,
};
pub use db_service::{DbManager, DbService};

#[cfg(any(test, feature = "test-utils"))]
pub use cache_service::MockCacheService;
#[cfg(any(test, feature = "test-utils"))]
pub use db_service::MockDbService;

/// Common surface of the crawler-facing services.
pub trait Service: Send + Sync {
    fn name(&self) -> ServiceName;
}

/// Store handles shared by the crawler-facing services.
#[derive(Clone)]
pub struct Stores {
    persistence: Arc<Persistence>,
    cache: Cache,
}

impl Stores {
    pub fn new(persistence: Arc<Persistence>, cache: Cache) -> Self {
        Self { persistence, cache }
    }

    pub fn persistence(&self) -> &Arc<Persistence> {
        &self.persistence
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}
