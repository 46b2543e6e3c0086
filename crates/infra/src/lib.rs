//! Infrastructure layer: record storage, configuration, and the warehouse service.

pub mod config;
pub mod record_store;
pub mod warehouse;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use record_store::{InMemoryRecordStore, RecordStore, RecordStoreError, SqliteRecordStore};
pub use warehouse::{
    LocationDetail, MovementFormOptions, ProductDetail, Warehouse, WarehouseError, WarehouseResult,
};
