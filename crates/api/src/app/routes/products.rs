use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};

use stockroom_core::{FormFields, ProductId};
use stockroom_infra::Warehouse;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product))
        .route("/:id/edit", post(update_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<Warehouse>>,
    Form(fields): Form<FormFields>,
) -> axum::response::Response {
    match services.create_product(&fields).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<Warehouse>>) -> axum::response::Response {
    match services.list_products().await {
        Ok(products) => dto::items_response(products),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

/// Product plus every movement that references it, newest first.
pub async fn get_product(
    Extension(services): Extension<Arc<Warehouse>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.product_detail(&id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<Warehouse>>,
    Path(id): Path<String>,
    Form(fields): Form<FormFields>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_product(&id, &fields).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}
