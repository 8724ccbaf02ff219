//! Check command - establishes both stores and builds every service.

use std::sync::Arc;

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Connections;
use crate::registry::{ServiceName, ServiceRegistry};

/// Execute the check command
pub async fn execute(args: CheckArgs, config: Config) -> AppResult<()> {
    tracing::info!("Connecting to stores...");
    let connections = Connections::establish(&config).await?;

    if args.connections_only {
        tracing::info!("Stores reachable");
        return Ok(());
    }

    let registry = Arc::new(ServiceRegistry::from_connections(&connections));
    registry.warm_up()?;

    for name in ServiceName::ALL {
        tracing::info!(service = %name, "service ready");
    }

    registry.db()?.ping().await?;
    tracing::info!("All services ready");

    Ok(())
}
