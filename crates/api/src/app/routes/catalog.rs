use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use equipstock_catalog::EquipmentStatus;
use equipstock_core::EquipmentTypeId;
use equipstock_infra::CreateEquipmentType;

use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_equipment_type).get(list_equipment_types))
        .route("/by-ids", get(get_equipment_types_by_ids))
        .route("/:id", get(get_equipment_type))
}

pub async fn create_equipment_type(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::CreateEquipmentTypeRequest>,
) -> axum::response::Response {
    let status: EquipmentStatus = match body.status.parse() {
        Ok(s) => s,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", format!("{e}")),
    };

    let cmd = CreateEquipmentType {
        name: body.name,
        description: body.description,
        status,
        useful_life_years: body.useful_life_years,
    };

    match services.catalog.create_equipment_type(cmd).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::equipment_to_json(&created))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_equipment_types(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.list_equipment_types().await {
        Ok(all) => Json(all.iter().map(dto::equipment_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_equipment_type(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EquipmentTypeId = match errors::parse_id(&id, "equipment type") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get_equipment_type(id).await {
        Ok(e) => Json(dto::equipment_to_json(&e)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_equipment_types_by_ids(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ByIdsQuery>,
) -> axum::response::Response {
    let ids = match errors::parse_ids(query.ids.as_deref().unwrap_or_default()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get_equipment_types_by_ids(&ids).await {
        Ok(found) => Json(found.iter().map(dto::equipment_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
