//! Stock Ledger: per-location stock records and their business rules.
//!
//! ```text
//! caller
//!   ↓
//! 1. Resolve equipment type (catalog)
//!   ↓
//! 2. Check domain rules (operational status, non-negative quantity)
//!   ↓
//! 3. Resolve location (external service, never cached)
//!   ↓
//! 4. Atomic write at the store (upsert / conditional decrement)
//!   ↓
//! 5. Enriched record back to the caller (+ low-stock alert on consume)
//! ```
//!
//! Every check that can reject an operation runs before the write, so a
//! rejected add or consume leaves the store untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use equipstock_catalog::EquipmentType;
use equipstock_core::{EquipmentTypeId, LocationId, StockRecordId};
use equipstock_stock::{LocationRef, LowStockAlert, StockLevels, StockRecord};

use crate::alerts::AlertSink;
use crate::catalog_manager::CatalogManager;
use crate::error::{LedgerError, LedgerResult};
use crate::location::LocationResolver;
use crate::store::{ConsumeOutcome, StockRepository, StockUpsert, StoreError};

/// Input for `StockLedger::add_or_update_stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddStock {
    pub equipment_id: EquipmentTypeId,
    pub location_id: LocationId,
    pub quantity: i32,
    pub min_threshold: i32,
    pub max_threshold: i32,
}

/// A stock record as handed back to callers: the full equipment record and the
/// location's display name instead of bare foreign keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedStock {
    pub id: StockRecordId,
    pub quantity: i32,
    pub min_threshold: i32,
    pub max_threshold: i32,
    pub updated_on: NaiveDate,
    pub equipment: EquipmentType,
    pub location: LocationRef,
}

impl EnrichedStock {
    fn new(record: StockRecord, equipment: EquipmentType, location: LocationRef) -> Self {
        Self {
            id: record.id,
            quantity: record.levels.quantity(),
            min_threshold: record.levels.min_threshold(),
            max_threshold: record.levels.max_threshold(),
            updated_on: record.updated_on,
            equipment,
            location,
        }
    }
}

#[derive(Clone)]
pub struct StockLedger {
    catalog: CatalogManager,
    stock: Arc<dyn StockRepository>,
    locations: Arc<dyn LocationResolver>,
    alerts: Arc<dyn AlertSink>,
}

impl StockLedger {
    pub fn new(
        catalog: CatalogManager,
        stock: Arc<dyn StockRepository>,
        locations: Arc<dyn LocationResolver>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            catalog,
            stock,
            locations,
            alerts,
        }
    }

    /// Create the record for (equipment, location), or overwrite its quantity
    /// and thresholds if it already exists.
    ///
    /// `max_threshold` is stored as given; the quantity is not capped by it.
    #[instrument(
        skip(self, cmd),
        fields(
            equipment_id = %cmd.equipment_id,
            location_id = %cmd.location_id,
            quantity = cmd.quantity
        ),
        err
    )]
    pub async fn add_or_update_stock(&self, cmd: AddStock) -> LedgerResult<EnrichedStock> {
        let levels = StockLevels::new(cmd.quantity, cmd.min_threshold, cmd.max_threshold)?;

        let equipment = self.catalog.get_equipment_type(cmd.equipment_id).await?;
        equipment.ensure_operational()?;

        let location = self.locations.resolve(cmd.location_id).await?;

        let record = self
            .stock
            .upsert(StockUpsert {
                equipment_id: equipment.id,
                location_id: location.id,
                levels,
                updated_on: today(),
            })
            .await?;

        info!(stock_id = %record.id, "stock record written");
        Ok(EnrichedStock::new(record, equipment, location))
    }

    /// All records at a location. An existing location with no stock yields
    /// an empty list; an unknown location is `NotFound`.
    #[instrument(skip(self), fields(location_id = %location_id), err)]
    pub async fn get_stock_by_location(&self, location_id: LocationId) -> LedgerResult<Vec<EnrichedStock>> {
        let location = self.locations.resolve(location_id).await?;
        let records = self.stock.list_by_location(location_id).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<EquipmentTypeId> = records.iter().map(|r| r.equipment_id).collect();
        let equipment: HashMap<EquipmentTypeId, EquipmentType> = self
            .catalog
            .get_equipment_types_by_ids(&ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        records
            .into_iter()
            .map(|record| {
                let eq = equipment.get(&record.equipment_id).cloned().ok_or_else(|| {
                    LedgerError::Store(StoreError::Corrupt(format!(
                        "stock record {} references missing equipment type {}",
                        record.id, record.equipment_id
                    )))
                })?;
                Ok(EnrichedStock::new(record, eq, location.clone()))
            })
            .collect()
    }

    /// The record for one (equipment, location) pair.
    #[instrument(skip(self), fields(location_id = %location_id, equipment_id = %equipment_id), err)]
    pub async fn get_stock_detail(
        &self,
        location_id: LocationId,
        equipment_id: EquipmentTypeId,
    ) -> LedgerResult<EnrichedStock> {
        let location = self.locations.resolve(location_id).await?;

        let record = self
            .stock
            .find_by_pair(equipment_id, location_id)
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "no stock for equipment type {equipment_id} at location {location_id}"
                ))
            })?;

        let equipment = self.catalog.get_equipment_type(record.equipment_id).await?;
        Ok(EnrichedStock::new(record, equipment, location))
    }

    /// Take `amount` out of a record.
    ///
    /// Fails with `InvalidState` when the result would be negative, leaving the
    /// record unchanged. A negative `amount` is accepted and restocks. Raises a
    /// low-stock alert when the new quantity is under the minimum threshold.
    #[instrument(skip(self), fields(stock_id = %stock_id), err)]
    pub async fn consume_stock(&self, stock_id: StockRecordId, amount: i32) -> LedgerResult<EnrichedStock> {
        let record = self
            .stock
            .find(stock_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("stock record {stock_id} not found")))?;

        // Reject from the current snapshot before touching anything else.
        record.levels.consume(amount)?;
        if amount < 0 {
            warn!(stock_id = %stock_id, amount, "negative consumption restocks the record");
        }

        let equipment = self.catalog.get_equipment_type(record.equipment_id).await?;
        let location = self.locations.resolve(record.location_id).await?;

        let updated = match self.stock.consume(stock_id, amount, today()).await? {
            ConsumeOutcome::Applied(updated) => updated,
            ConsumeOutcome::Insufficient { available } => {
                return Err(LedgerError::InvalidState(format!(
                    "insufficient stock: {available} available, {amount} requested"
                )));
            }
            ConsumeOutcome::Missing => {
                return Err(LedgerError::NotFound(format!("stock record {stock_id} not found")));
            }
        };

        if let Some(alert) = LowStockAlert::check(&updated, &equipment.name) {
            self.alerts.emit(alert);
        }

        info!(quantity = updated.quantity(), "stock consumed");
        Ok(EnrichedStock::new(updated, equipment, location))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
