//! Service registry - lazily built, process-lifetime service singletons.
//!
//! One slot per [`ServiceName`]. The first access to a slot runs its factory;
//! every later access, from any thread, gets the same `Arc`. Each slot has
//! its own guard, so cold starts of unrelated services never wait on each
//! other.
//!
//! The registry is a plain value: build it once at startup and pass it around
//! behind an `Arc`. Tests build their own with [`ServiceRegistry::builder`].

mod name;
mod slot;

use std::sync::Arc;

use crate::errors::AppResult;
use crate::infra::{Connections, Persistence};
use crate::services::{
    CacheService, ConfigManager, ConfigService, DbManager, DbService, InMemoryCache,
    PluginManager, PluginService, ProjectConfigManager, ProjectConfigService, ProjectManager,
    ProjectService, ProxyManager, ProxyService, PushSourceManager, PushSourceService,
    QueueManager, QueueService, ResultManager, ResultService, StatisticManager,
    StatisticService, Stores, TaskManager, TaskService,
};

pub use name::ServiceName;
pub use slot::{Factory, Slot};

macro_rules! service_registry {
    ($($(#[$meta:meta])* $field:ident: $service:ident => $name:ident),+ $(,)?) => {
        pub struct ServiceRegistry {
            $($field: Slot<dyn $service>,)+
        }

        /// Collects one factory per service; unset services fail on access.
        #[derive(Default)]
        pub struct RegistryBuilder {
            $($field: Option<Factory<dyn $service>>,)+
        }

        impl RegistryBuilder {
            $(
                pub fn $field<F>(mut self, factory: F) -> Self
                where
                    F: Fn() -> AppResult<Arc<dyn $service>> + Send + Sync + 'static,
                {
                    self.$field = Some(Box::new(factory));
                    self
                }
            )+

            pub fn build(self) -> ServiceRegistry {
                ServiceRegistry {
                    $($field: Slot::new(
                        ServiceName::$name,
                        self.$field
                            .unwrap_or_else(|| slot::unregistered(ServiceName::$name)),
                    ),)+
                }
            }
        }

        impl ServiceRegistry {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> AppResult<Arc<dyn $service>> {
                    self.$field.get()
                }
            )+

            /// Whether the named service has been built yet.
            pub fn is_initialized(&self, name: ServiceName) -> bool {
                match name {
                    $(ServiceName::$name => self.$field.is_initialized(),)+
                }
            }

            /// Build every service now instead of on first use.
            pub fn warm_up(&self) -> AppResult<()> {
                $(self.$field.get()?;)+
                Ok(())
            }
        }
    };
}

service_registry! {
    /// Get project service
    project: ProjectService => Project,
    /// Get project config service
    project_config: ProjectConfigService => ProjectConfig,
    /// Get result service
    result: ResultService => Result,
    /// Get task service
    task: TaskService => Task,
    /// Get queue service
    queue: QueueService => Queue,
    /// Get plugin service
    plugin: PluginService => Plugin,
    /// Get config service
    config: ConfigService => Config,
    /// Get statistic service
    statistic: StatisticService => Statistic,
    /// Get proxy service
    proxy: ProxyService => Proxy,
    /// Get push source service
    push_source: PushSourceService => PushSource,
    /// Get the in-process cache service
    cache: CacheService => Cache,
    /// Get db service
    db: DbService => Db,
}

impl ServiceRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry wired to the default implementation of every service.
    ///
    /// Nothing is built here; each factory runs on its slot's first access.
    pub fn from_connections(connections: &Connections) -> Self {
        let persistence = Arc::new(Persistence::new(connections.database().get_connection()));
        let stores = Stores::new(persistence.clone(), connections.cache().clone());

        Self::builder()
            .project(with_stores::<dyn ProjectService>(&stores, |s| {
                Arc::new(ProjectManager::new(s))
            }))
            .project_config(with_stores::<dyn ProjectConfigService>(&stores, |s| {
                Arc::new(ProjectConfigManager::new(s))
            }))
            .result(with_stores::<dyn ResultService>(&stores, |s| Arc::new(ResultManager::new(s))))
            .task(with_stores::<dyn TaskService>(&stores, |s| Arc::new(TaskManager::new(s))))
            .queue(with_stores::<dyn QueueService>(&stores, |s| Arc::new(QueueManager::new(s))))
            .plugin(with_stores::<dyn PluginService>(&stores, |s| Arc::new(PluginManager::new(s))))
            .config(with_stores::<dyn ConfigService>(&stores, |s| Arc::new(ConfigManager::new(s))))
            .statistic(with_stores::<dyn StatisticService>(&stores, |s| {
                Arc::new(StatisticManager::new(s))
            }))
            .proxy(with_stores::<dyn ProxyService>(&stores, |s| Arc::new(ProxyManager::new(s))))
            .push_source(with_stores::<dyn PushSourceService>(&stores, |s| {
                Arc::new(PushSourceManager::new(s))
            }))
            .cache(|| Ok(Arc::new(InMemoryCache::new()) as Arc<dyn CacheService>))
            .db(move || Ok(Arc::new(DbManager::new(persistence.clone())) as Arc<dyn DbService>))
            .build()
    }
}

fn with_stores<T: ?Sized + 'static>(
    stores: &Stores,
    build: fn(Stores) -> Arc<T>,
) -> impl Fn() -> AppResult<Arc<T>> + Send + Sync + 'static {
    let stores = stores.clone();
    move || Ok(build(stores.clone()))
}
