use serde::Deserialize;

use equipstock_catalog::EquipmentType;
use equipstock_infra::EnrichedStock;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateEquipmentTypeRequest {
    pub name: String,
    pub description: String,
    /// One of `operational`, `under_maintenance`, `out_of_service`, `retired`.
    pub status: String,
    pub useful_life_years: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    pub equipment_id: i32,
    pub location_id: i32,
    pub quantity: i32,
    pub min_threshold: i32,
    pub max_threshold: i32,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeStockRequest {
    pub stock_id: i32,
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub struct ByIdsQuery {
    pub ids: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn equipment_to_json(e: &EquipmentType) -> serde_json::Value {
    serde_json::json!({
        "id": e.id.get(),
        "name": e.name,
        "description": e.description,
        "status": e.status.as_str(),
        "acquired_on": e.acquired_on.to_string(),
        "useful_life_years": e.useful_life_years,
    })
}

pub fn stock_to_json(s: &EnrichedStock) -> serde_json::Value {
    serde_json::json!({
        "id": s.id.get(),
        "quantity": s.quantity,
        "min_threshold": s.min_threshold,
        "max_threshold": s.max_threshold,
        "updated_on": s.updated_on.to_string(),
        "equipment": equipment_to_json(&s.equipment),
        "location_id": s.location.id.get(),
        "location_name": s.location.name,
    })
}
