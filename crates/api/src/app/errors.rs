use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_infra::WarehouseError;

pub fn warehouse_error_to_response(err: WarehouseError) -> axum::response::Response {
    match err {
        WarehouseError::DuplicateKey(msg) => json_error(StatusCode::CONFLICT, "duplicate_key", msg),
        WarehouseError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        WarehouseError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        WarehouseError::Store(msg) => {
            tracing::error!(error = %msg, "record store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
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
