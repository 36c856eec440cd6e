//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Catalog:
///   - GET  /api/v1/products?category=&page= - One page of products
///   - GET  /api/v1/products/{product_id} - Get product by ID
///   - GET  /api/v1/categories?selected= - Category navigation menu
///
/// - Carts (one per session id):
///   - POST   /api/v1/carts - Start a session, returns a fresh session id
///   - GET    /api/v1/carts/{session_id} - Cart summary
///   - DELETE /api/v1/carts/{session_id} - Empty the cart
///   - POST   /api/v1/carts/{session_id}/items - Add `{product_id, quantity}`
///   - DELETE /api/v1/carts/{session_id}/items/{product_id} - Remove a line
///   - POST   /api/v1/carts/{session_id}/checkout - Submit with shipping details
pub fn create_router(state: AppState) -> Router {
    // Only the read-only catalog is exposed cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let catalog_routes = Router::new()
        .route("/products", get(handlers::list_product_page))
        .route("/products/{product_id}", get(handlers::get_product))
        .route("/categories", get(handlers::category_menu_handler))
        .layer(cors);

    let cart_routes = Router::new()
        .route("/carts", post(handlers::create_cart_session))
        .route(
            "/carts/{session_id}",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        .route("/carts/{session_id}/items", post(handlers::add_cart_item))
        .route(
            "/carts/{session_id}/items/{product_id}",
            delete(handlers::remove_cart_item),
        )
        .route("/carts/{session_id}/checkout", post(handlers::checkout_cart));

    let api_routes = Router::new().merge(catalog_routes).merge(cart_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
