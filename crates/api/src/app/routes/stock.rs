use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use equipstock_core::{EquipmentTypeId, LocationId, StockRecordId};
use equipstock_infra::AddStock;

use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(add_or_update_stock))
        .route("/consume", post(consume_stock))
        .route("/locations/:location_id", get(get_stock_by_location))
        .route(
            "/locations/:location_id/equipment/:equipment_id",
            get(get_stock_detail),
        )
}

pub async fn add_or_update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::AddStockRequest>,
) -> axum::response::Response {
    let cmd = AddStock {
        equipment_id: EquipmentTypeId::new(body.equipment_id),
        location_id: LocationId::new(body.location_id),
        quantity: body.quantity,
        min_threshold: body.min_threshold,
        max_threshold: body.max_threshold,
    };

    match services.ledger.add_or_update_stock(cmd).await {
        Ok(stock) => (StatusCode::CREATED, Json(dto::stock_to_json(&stock))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_stock_by_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(location_id): Path<String>,
) -> axum::response::Response {
    let location_id: LocationId = match errors::parse_id(&location_id, "location") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.get_stock_by_location(location_id).await {
        Ok(stock) => Json(stock.iter().map(dto::stock_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_stock_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path((location_id, equipment_id)): Path<(String, String)>,
) -> axum::response::Response {
    let location_id: LocationId = match errors::parse_id(&location_id, "location") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let equipment_id: EquipmentTypeId = match errors::parse_id(&equipment_id, "equipment type") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.get_stock_detail(location_id, equipment_id).await {
        Ok(stock) => Json(dto::stock_to_json(&stock)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn consume_stock(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::ConsumeStockRequest>,
) -> axum::response::Response {
    match services
        .ledger
        .consume_stock(StockRecordId::new(body.stock_id), body.amount)
        .await
    {
        Ok(stock) => Json(dto::stock_to_json(&stock)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
