use std::sync::Arc;

use axum::extract::Extension;

use stockroom_infra::Warehouse;

use crate::app::{dto, errors};

/// Nonzero balance per (product, location), sorted by product name then location name.
pub async fn balance_report(Extension(services): Extension<Arc<Warehouse>>) -> axum::response::Response {
    match services.balance_report().await {
        Ok(lines) => dto::items_response(lines),
        Err(e) => errors::warehouse_error_to_response(e),
    }
}
