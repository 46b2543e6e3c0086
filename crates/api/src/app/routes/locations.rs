use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};

use stockroom_core::{FormFields, LocationId};
use stockroom_infra::Warehouse;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_location).get(list_locations))
        .route("/:id", get(get_location))
        .route("/:id/edit", post(update_location))
}

pub async fn create_location(
    Extension(services): Extension<Arc<Warehouse>>,
    Form(fields): Form<FormFields>,
) -> axum::response::Response {
    match services.create_location(&fields).await {
        Ok(location) => (StatusCode::CREATED, Json(location)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

pub async fn list_locations(Extension(services): Extension<Arc<Warehouse>>) -> axum::response::Response {
    match services.list_locations().await {
        Ok(locations) => dto::items_response(locations),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

/// Location plus every movement into or out of it, newest first.
pub async fn get_location(
    Extension(services): Extension<Arc<Warehouse>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LocationId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.location_detail(&id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

pub async fn update_location(
    Extension(services): Extension<Arc<Warehouse>>,
    Path(id): Path<String>,
    Form(fields): Form<FormFields>,
) -> axum::response::Response {
    let id: LocationId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_location(&id, &fields).await {
        Ok(location) => (StatusCode::OK, Json(location)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}
