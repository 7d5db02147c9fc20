use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use equipstock_core::EquipmentTypeId;
use equipstock_infra::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        LedgerError::InvalidState(msg) => json_error(StatusCode::CONFLICT, "invalid_state", msg),
        LedgerError::DependencyUnavailable(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "dependency_unavailable",
            err.to_string(),
        ),
        LedgerError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        LedgerError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id '{raw}'")))
}

/// Parse a comma-separated id list (`1,2,3`). Blank entries are skipped.
pub fn parse_ids(raw: &str) -> Result<Vec<EquipmentTypeId>, axum::response::Response> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<EquipmentTypeId>().map_err(|_| {
                json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_ids",
                    format!("ids must be a comma-separated list of integers, got '{s}'"),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ids_accepts_spaces_and_blanks() {
        let ids = parse_ids(" 1, 2,,3 ").unwrap();
        assert_eq!(
            ids,
            vec![EquipmentTypeId::new(1), EquipmentTypeId::new(2), EquipmentTypeId::new(3)]
        );
        assert!(parse_ids("").unwrap().is_empty());
    }

    #[test]
    fn parse_ids_rejects_garbage() {
        let resp = parse_ids("1,two").unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ledger_errors_map_to_statuses() {
        let cases = [
            (LedgerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (LedgerError::InvalidState("x".into()), StatusCode::CONFLICT),
            (LedgerError::DependencyUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (LedgerError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                LedgerError::Store(equipstock_infra::StoreError::Poisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ledger_error_to_response(err).status(), status);
        }
    }
}
