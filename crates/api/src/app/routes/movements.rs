use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};

use stockroom_core::{FormFields, MovementId};
use stockroom_infra::Warehouse;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_movement).get(list_movements))
        .route("/options", get(movement_form_options))
        .route("/:id", get(get_movement))
        .route("/:id/edit", post(update_movement))
}

/// Record a movement. The server stamps the timestamp.
pub async fn create_movement(
    Extension(services): Extension<Arc<Warehouse>>,
    Form(fields): Form<FormFields>,
) -> axum::response::Response {
    match services.create_movement(&fields).await {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

/// All movements, newest first.
pub async fn list_movements(Extension(services): Extension<Arc<Warehouse>>) -> axum::response::Response {
    match services.list_movements().await {
        Ok(movements) => dto::items_response(movements),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

pub async fn movement_form_options(
    Extension(services): Extension<Arc<Warehouse>>,
) -> axum::response::Response {
    match services.movement_form_options().await {
        Ok(options) => (StatusCode::OK, Json(options)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

pub async fn get_movement(
    Extension(services): Extension<Arc<Warehouse>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MovementId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_movement(&id).await {
        Ok(movement) => (StatusCode::OK, Json(movement)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

/// Edit keeps the original id and timestamp.
pub async fn update_movement(
    Extension(services): Extension<Arc<Warehouse>>,
    Path(id): Path<String>,
    Form(fields): Form<FormFields>,
) -> axum::response::Response {
    let id: MovementId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_movement(&id, &fields).await {
        Ok(movement) => (StatusCode::OK, Json(movement)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}
