//! HTTP route handlers for the backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (verifies database)
//!
//! # Catalog (read-only pass-through)
//! GET  /products                  - Product listing
//! GET  /products/{id}             - Product detail
//!
//! # Cart (caller identity from x-user-id, set by the auth gateway)
//! GET    /cart                    - Cart view (creates the cart lazily)
//! POST   /cart/items              - Add item (merges into existing line)
//! DELETE /cart/items              - Clear all items
//! PUT    /cart/items/{product_id} - Set line quantity (absolute)
//! DELETE /cart/items/{product_id} - Remove line
//! PUT    /cart/state              - Transition cart state
//! ```

pub mod cart;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add).delete(cart::clear))
        .route(
            "/items/{product_id}",
            put(cart::set_quantity).delete(cart::remove),
        )
        .route("/state", put(cart::set_state))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create all routes for the backend.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/products", product_routes())
}
