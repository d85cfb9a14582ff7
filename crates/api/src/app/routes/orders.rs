use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use orderflow_core::OrderNumber;
use orderflow_orders::OrderRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order))
        .route("/:order_number", get(get_order))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", e.body_text()),
    };

    match services.place_order(request).await {
        Ok(confirmation) => (
            StatusCode::CREATED,
            Json(dto::PlaceOrderResponse::from(confirmation)),
        )
            .into_response(),
        Err(e) => errors::placement_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(order_number): Path<String>,
) -> axum::response::Response {
    let order_number: OrderNumber = match order_number.parse() {
        Ok(n) => n,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_order_number",
                format!("{e}"),
            );
        }
    };

    match services.find_order(order_number).await {
        Ok(Some(order)) => (StatusCode::OK, Json(dto::OrderResponse::from(&order))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::placement_error_to_response(e),
    }
}
