use axum::Router;

pub mod orders;
pub mod system;

/// Router for all order endpoints.
pub fn router() -> Router {
    Router::new().nest("/api/order", orders::router())
}
