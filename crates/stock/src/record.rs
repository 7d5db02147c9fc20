use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use equipstock_core::{
    DomainError, DomainResult, Entity, EquipmentTypeId, LocationId, StockRecordId, ValueObject,
};

/// Quantity on hand plus the configured thresholds.
///
/// `max_threshold` is stored metadata only; writes are never capped by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    quantity: i32,
    min_threshold: i32,
    max_threshold: i32,
}

impl ValueObject for StockLevels {}

impl StockLevels {
    /// Build levels for a write. Quantity can never be negative.
    pub fn new(quantity: i32, min_threshold: i32, max_threshold: i32) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative (got {quantity})"
            )));
        }
        Ok(Self {
            quantity,
            min_threshold,
            max_threshold,
        })
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn min_threshold(&self) -> i32 {
        self.min_threshold
    }

    pub fn max_threshold(&self) -> i32 {
        self.max_threshold
    }

    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.min_threshold
    }

    /// Levels after taking `amount` out. Thresholds are unchanged.
    pub fn consume(self, amount: i32) -> DomainResult<Self> {
        let quantity = remaining_after(self.quantity, amount)?;
        Ok(Self { quantity, ..self })
    }
}

/// Quantity left after consuming `amount` from `current`.
///
/// A negative `amount` is accepted and behaves as a restock; only a negative
/// result is rejected.
pub fn remaining_after(current: i32, amount: i32) -> DomainResult<i32> {
    let remaining = current.checked_sub(amount).ok_or_else(|| {
        DomainError::validation(format!("consuming {amount} from {current} overflows the quantity"))
    })?;
    if remaining < 0 {
        return Err(DomainError::invalid_state(format!(
            "insufficient stock: {current} available, {amount} requested"
        )));
    }
    Ok(remaining)
}

/// Quantity of one equipment type at one location.
///
/// At most one record exists per (equipment, location) pair; stores enforce
/// that as a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: StockRecordId,
    pub equipment_id: EquipmentTypeId,
    pub location_id: LocationId,
    pub levels: StockLevels,
    pub updated_on: NaiveDate,
}

impl Entity for StockRecord {
    type Id = StockRecordId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl StockRecord {
    pub fn quantity(&self) -> i32 {
        self.levels.quantity()
    }

    pub fn is_below_minimum(&self) -> bool {
        self.levels.is_below_minimum()
    }
}
