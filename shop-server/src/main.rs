use anyhow::Context;
use shared::snapshot::Collection;
use shop_server::{ShopManager, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, work dir, logger
    let config = setup_environment()?;
    tracing::info!(
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Bike shop engine starting..."
    );

    // 2. Open the store (seeds slots and catalog on first start)
    let manager = ShopManager::open(&config)
        .with_context(|| format!("failed to open {}", config.db_path().display()))?;

    let kpi = manager.storage_kpi()?;
    tracing::info!(
        vacant = kpi.vacant,
        occupied = kpi.occupied,
        on_ride = kpi.on_ride,
        overdue = kpi.overdue,
        "Storage grid loaded"
    );

    // 3. Stream snapshot activity until shutdown
    for collection in Collection::ALL {
        let (initial, mut rx) = manager.subscribe(collection)?;
        tracing::info!(%collection, documents = initial.len(), "Subscribed");
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => {
                        tracing::info!(%collection, documents = snapshot.len(), "Snapshot");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%collection, skipped, "Snapshot receiver lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!(epoch = %manager.epoch(), "Shutting down");
    Ok(())
}
