use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use orderflow_infra::PlacementError;

pub fn placement_error_to_response(err: PlacementError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        PlacementError::OutOfStock { sku_codes } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "out_of_stock",
                "message": message,
                "unavailableSkuCodes": sku_codes,
            })),
        )
            .into_response(),
        PlacementError::Inventory(_) => json_error(StatusCode::BAD_GATEWAY, "inventory_unavailable", message),
        PlacementError::Store(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message),
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
