use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use stockroom_core::DomainError;

use crate::app::errors;

/// List envelope: `{"items": [...]}`.
#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

pub fn items_response<T: Serialize>(items: Vec<T>) -> axum::response::Response {
    (StatusCode::OK, Json(Items { items })).into_response()
}

/// Parse a path-embedded identifier. A blank id can never be stored, so it is
/// reported as not found.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|e| errors::json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()))
}
