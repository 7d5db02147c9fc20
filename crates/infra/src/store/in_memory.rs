use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use equipstock_catalog::{EquipmentType, NewEquipmentType};
use equipstock_core::{DomainError, EquipmentTypeId, LocationId, StockRecordId};
use equipstock_stock::StockRecord;

use super::{ConsumeOutcome, EquipmentRepository, StockRepository, StockUpsert, StoreError};

#[derive(Debug, Default)]
struct CatalogTable {
    last_id: i32,
    rows: BTreeMap<EquipmentTypeId, EquipmentType>,
}

#[derive(Debug, Default)]
struct StockTable {
    last_id: i32,
    rows: BTreeMap<StockRecordId, StockRecord>,
    // Unique index on (equipment, location).
    by_pair: HashMap<(EquipmentTypeId, LocationId), StockRecordId>,
}

/// In-memory store for tests/dev.
///
/// Each mutation runs under one write lock, which gives the same per-record
/// atomicity the Postgres store gets from single-statement writes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    catalog: RwLock<CatalogTable>,
    stock: RwLock<StockTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EquipmentRepository for InMemoryStore {
    async fn insert(&self, new: NewEquipmentType) -> Result<EquipmentType, StoreError> {
        let mut table = self.catalog.write().map_err(|_| StoreError::Poisoned)?;
        table.last_id += 1;
        let equipment = new.into_equipment(EquipmentTypeId::new(table.last_id));
        table.rows.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn find(&self, id: EquipmentTypeId) -> Result<Option<EquipmentType>, StoreError> {
        let table = self.catalog.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[EquipmentTypeId]) -> Result<Vec<EquipmentType>, StoreError> {
        let table = self.catalog.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table
            .rows
            .values()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<EquipmentType>, StoreError> {
        let table = self.catalog.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.values().cloned().collect())
    }
}

#[async_trait]
impl StockRepository for InMemoryStore {
    async fn find(&self, id: StockRecordId) -> Result<Option<StockRecord>, StoreError> {
        let table = self.stock.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        equipment_id: EquipmentTypeId,
        location_id: LocationId,
    ) -> Result<Option<StockRecord>, StoreError> {
        let table = self.stock.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table
            .by_pair
            .get(&(equipment_id, location_id))
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn list_by_location(&self, location_id: LocationId) -> Result<Vec<StockRecord>, StoreError> {
        let table = self.stock.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table
            .rows
            .values()
            .filter(|r| r.location_id == location_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, upsert: StockUpsert) -> Result<StockRecord, StoreError> {
        let mut table = self.stock.write().map_err(|_| StoreError::Poisoned)?;
        let key = (upsert.equipment_id, upsert.location_id);

        let existing = table.by_pair.get(&key).copied();
        let id = match existing {
            Some(id) => id,
            None => {
                table.last_id += 1;
                let id = StockRecordId::new(table.last_id);
                table.by_pair.insert(key, id);
                id
            }
        };

        let record = StockRecord {
            id,
            equipment_id: upsert.equipment_id,
            location_id: upsert.location_id,
            levels: upsert.levels,
            updated_on: upsert.updated_on,
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn consume(
        &self,
        id: StockRecordId,
        amount: i32,
        updated_on: NaiveDate,
    ) -> Result<ConsumeOutcome, StoreError> {
        let mut table = self.stock.write().map_err(|_| StoreError::Poisoned)?;
        let Some(record) = table.rows.get_mut(&id) else {
            return Ok(ConsumeOutcome::Missing);
        };

        let available = record.quantity();
        match record.levels.consume(amount) {
            Ok(levels) => {
                record.levels = levels;
                record.updated_on = updated_on;
                Ok(ConsumeOutcome::Applied(record.clone()))
            }
            Err(DomainError::InvalidState(_)) => Ok(ConsumeOutcome::Insufficient { available }),
            Err(e) => Err(StoreError::Conflict {
                operation: "consume_stock",
                message: e.to_string(),
            }),
        }
    }
}
