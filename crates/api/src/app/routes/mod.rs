use axum::Router;

pub mod catalog;
pub mod stock;
pub mod system;

/// Router for the equipment endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/equipment/types", catalog::router())
        .nest("/equipment/stock", stock::router())
}
