//! Crawler-facing business services.
//!
//! Their operations live with the crawler itself; here each one is a
//! capability trait plus a default handle that carries the shared stores.

use super::{Service, Stores};
use crate::registry::ServiceName;

macro_rules! store_backed_service {
    ($(#[$meta:meta])* $service:ident, $handle:ident, $name:ident) => {
        $(#[$meta])*
        pub trait $service: Service {}

        #[derive(Clone)]
        pub struct $handle {
            stores: Stores,
        }

        impl $handle {
            pub fn new(stores: Stores) -> Self {
                Self { stores }
            }

            pub fn stores(&self) -> &Stores {
                &self.stores
            }
        }

        impl Service for $handle {
            fn name(&self) -> ServiceName {
                ServiceName::$name
            }
        }

        impl $service for $handle {}
    };
}

store_backed_service!(
    /// Crawl project definitions.
    ProjectService, ProjectManager, Project
);
store_backed_service!(
    /// Per-project crawl settings.
    ProjectConfigService, ProjectConfigManager, ProjectConfig
);
store_backed_service!(
    /// Extracted crawl results.
    ResultService, ResultManager, Result
);
store_backed_service!(
    /// Crawl task lifecycle.
    TaskService, TaskManager, Task
);
store_backed_service!(
    /// Pending request queue.
    QueueService, QueueManager, Queue
);
store_backed_service!(
    /// Extraction plugins.
    PluginService, PluginManager, Plugin
);
store_backed_service!(
    /// Global key/value settings.
    ConfigService, ConfigManager, Config
);
store_backed_service!(
    /// Crawl statistics.
    StatisticService, StatisticManager, Statistic
);
store_backed_service!(
    /// Outbound proxy pool.
    ProxyService, ProxyManager, Proxy
);
store_backed_service!(
    /// Result push destinations.
    PushSourceService, PushSourceManager, PushSource
);
