//! Infrastructure layer: stores, location service client, config and the
//! catalog/stock engines built on top of them.

pub mod alerts;
pub mod catalog_manager;
pub mod config;
pub mod error;
pub mod location;
pub mod stock_ledger;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use alerts::{AlertSink, RecordingAlertSink, TracingAlertSink};
pub use catalog_manager::{CatalogManager, CreateEquipmentType};
pub use config::{AppConfig, ConfigError, LocationServiceConfig};
pub use error::{LedgerError, LedgerResult};
pub use location::{HttpLocationResolver, InMemoryLocationDirectory, LocationError, LocationResolver};
pub use stock_ledger::{AddStock, EnrichedStock, StockLedger};
pub use store::{EquipmentRepository, InMemoryStore, PostgresStore, StockRepository, StoreError};
