use std::fmt;

/// The fixed set of services the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Project,
    ProjectConfig,
    Result,
    Task,
    Queue,
    Plugin,
    Config,
    Statistic,
    Proxy,
    PushSource,
    Cache,
    Db,
}

impl ServiceName {
    pub const ALL: [ServiceName; 12] = [
        ServiceName::Project,
        ServiceName::ProjectConfig,
        ServiceName::Result,
        ServiceName::Task,
        ServiceName::Queue,
        ServiceName::Plugin,
        ServiceName::Config,
        ServiceName::Statistic,
        ServiceName::Proxy,
        ServiceName::PushSource,
        ServiceName::Cache,
        ServiceName::Db,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Project => "project",
            ServiceName::ProjectConfig => "project-config",
            ServiceName::Result => "result",
            ServiceName::Task => "task",
            ServiceName::Queue => "queue",
            ServiceName::Plugin => "plugin",
            ServiceName::Config => "config",
            ServiceName::Statistic => "statistic",
            ServiceName::Proxy => "proxy",
            ServiceName::PushSource => "push-source",
            ServiceName::Cache => "cache",
            ServiceName::Db => "db",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
