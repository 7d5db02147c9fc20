use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use equipstock_core::{EquipmentTypeId, LocationId, StockRecordId};

use crate::record::StockRecord;

/// Non-fatal signal raised when a consumption leaves a record under its
/// minimum threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub stock_id: StockRecordId,
    pub equipment_id: EquipmentTypeId,
    pub equipment_name: String,
    pub location_id: LocationId,
    pub quantity: i32,
    pub min_threshold: i32,
    pub raised_on: NaiveDate,
}

impl LowStockAlert {
    /// Alert for `record`, or `None` when it is at or above its minimum.
    pub fn check(record: &StockRecord, equipment_name: &str) -> Option<Self> {
        if !record.is_below_minimum() {
            return None;
        }
        Some(Self {
            stock_id: record.id,
            equipment_id: record.equipment_id,
            equipment_name: equipment_name.to_string(),
            location_id: record.location_id,
            quantity: record.quantity(),
            min_threshold: record.levels.min_threshold(),
            raised_on: record.updated_on,
        })
    }
}
