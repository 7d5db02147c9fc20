//! Persistence for catalog entries and stock records.
//!
//! Two backends implement the same repository traits:
//! - `InMemoryStore` for dev/tests
//! - `PostgresStore` for production (`DATABASE_URL`)
//!
//! Stock mutations are atomic at this boundary: an upsert is a single
//! conflict-aware write on (equipment, location), and a consumption is a single
//! conditional decrement that refuses to take the quantity below zero. The
//! engine adds no locking of its own.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use equipstock_catalog::{EquipmentType, NewEquipmentType};
use equipstock_core::{EquipmentTypeId, LocationId, StockRecordId};
use equipstock_stock::{StockLevels, StockRecord};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or check constraint rejected the write.
    #[error("constraint violated in {operation}: {message}")]
    Conflict {
        operation: &'static str,
        message: String,
    },

    /// Any other database failure (connection, syntax, timeout).
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored row could not be mapped back into the domain.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// In-memory lock poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Values written by an add-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockUpsert {
    pub equipment_id: EquipmentTypeId,
    pub location_id: LocationId,
    pub levels: StockLevels,
    pub updated_on: NaiveDate,
}

/// Result of an atomic conditional decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The decrement was applied; the record as persisted.
    Applied(StockRecord),
    /// The decrement would have gone below zero; nothing was written.
    Insufficient { available: i32 },
    /// No record with that id.
    Missing,
}

#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn insert(&self, new: NewEquipmentType) -> Result<EquipmentType, StoreError>;
    async fn find(&self, id: EquipmentTypeId) -> Result<Option<EquipmentType>, StoreError>;
    async fn find_many(&self, ids: &[EquipmentTypeId]) -> Result<Vec<EquipmentType>, StoreError>;
    async fn list(&self) -> Result<Vec<EquipmentType>, StoreError>;
}

#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn find(&self, id: StockRecordId) -> Result<Option<StockRecord>, StoreError>;

    async fn find_by_pair(
        &self,
        equipment_id: EquipmentTypeId,
        location_id: LocationId,
    ) -> Result<Option<StockRecord>, StoreError>;

    async fn list_by_location(&self, location_id: LocationId) -> Result<Vec<StockRecord>, StoreError>;

    /// Create or overwrite the record for (equipment, location).
    async fn upsert(&self, upsert: StockUpsert) -> Result<StockRecord, StoreError>;

    /// Decrement by `amount` only if the result stays non-negative.
    async fn consume(
        &self,
        id: StockRecordId,
        amount: i32,
        updated_on: NaiveDate,
    ) -> Result<ConsumeOutcome, StoreError>;
}
