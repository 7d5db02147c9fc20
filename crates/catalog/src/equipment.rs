use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use equipstock_core::{DomainError, DomainResult, Entity, EquipmentTypeId};

/// Maximum length of an equipment type name (characters).
pub const NAME_MAX_CHARS: usize = 50;

/// Maximum length of an equipment type description (characters).
pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// Operational status of an equipment type.
///
/// Only `Operational` equipment may have stock added or modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Operational,
    UnderMaintenance,
    OutOfService,
    Retired,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::UnderMaintenance => "under_maintenance",
            EquipmentStatus::OutOfService => "out_of_service",
            EquipmentStatus::Retired => "retired",
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, EquipmentStatus::Operational)
    }
}

impl core::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = DomainError;

    /// Case-insensitive; spaces and dashes are accepted in place of underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "operational" => Ok(EquipmentStatus::Operational),
            "under_maintenance" => Ok(EquipmentStatus::UnderMaintenance),
            "out_of_service" => Ok(EquipmentStatus::OutOfService),
            "retired" => Ok(EquipmentStatus::Retired),
            _ => Err(DomainError::validation(format!(
                "unknown equipment status '{}' (expected one of: operational, under_maintenance, out_of_service, retired)",
                s.trim()
            ))),
        }
    }
}

/// Catalog entry: a class of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub id: EquipmentTypeId,
    pub name: String,
    pub description: String,
    pub status: EquipmentStatus,
    pub acquired_on: NaiveDate,
    pub useful_life_years: Option<u16>,
}

impl Entity for EquipmentType {
    type Id = EquipmentTypeId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl EquipmentType {
    /// Stock may only be added or modified for operational equipment.
    pub fn ensure_operational(&self) -> DomainResult<()> {
        if self.status.is_operational() {
            return Ok(());
        }
        Err(DomainError::invalid_state(format!(
            "cannot manage stock for equipment type {} ('{}') while it is {}",
            self.id, self.name, self.status
        )))
    }
}

/// Validated input for a new catalog entry. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEquipmentType {
    name: String,
    description: String,
    status: EquipmentStatus,
    acquired_on: NaiveDate,
    useful_life_years: Option<u16>,
}

impl NewEquipmentType {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        status: EquipmentStatus,
        acquired_on: NaiveDate,
        useful_life_years: Option<u16>,
    ) -> DomainResult<Self> {
        let name = required_field("name", name.into(), NAME_MAX_CHARS)?;
        let description = required_field("description", description.into(), DESCRIPTION_MAX_CHARS)?;

        Ok(Self {
            name,
            description,
            status,
            acquired_on,
            useful_life_years,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> EquipmentStatus {
        self.status
    }

    pub fn acquired_on(&self) -> NaiveDate {
        self.acquired_on
    }

    pub fn useful_life_years(&self) -> Option<u16> {
        self.useful_life_years
    }

    /// Bind the store-assigned id.
    pub fn into_equipment(self, id: EquipmentTypeId) -> EquipmentType {
        EquipmentType {
            id,
            name: self.name,
            description: self.description,
            status: self.status,
            acquired_on: self.acquired_on,
            useful_life_years: self.useful_life_years,
        }
    }
}

fn required_field(field: &str, value: String, max_chars: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}
