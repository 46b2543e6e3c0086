use std::sync::Arc;

use anyhow::Context;

use stockroom_infra::{SqliteRecordStore, StorageConfig, Warehouse};

/// Wire the warehouse service to the configured store backend.
pub async fn build_services(storage: &StorageConfig) -> anyhow::Result<Arc<Warehouse>> {
    let warehouse = match storage {
        StorageConfig::InMemory => {
            tracing::warn!("USE_PERSISTENT_STORES not set; records live in memory and are lost on exit");
            Warehouse::in_memory()
        }
        StorageConfig::Sqlite { database_url } => {
            let store = SqliteRecordStore::connect(database_url)
                .await
                .with_context(|| format!("failed to open SQLite store at {database_url}"))?;
            tracing::info!("using SQLite record store");
            Warehouse::sqlite(store)
        }
    };
    Ok(Arc::new(warehouse))
}
