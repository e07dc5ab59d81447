//! Cart route handlers.
//!
//! Thin JSON wrappers over the cart domain service; every mutation returns
//! the recomputed cart view.

use axum::{Json, extract::Path, extract::State};
use serde::Deserialize;
use tracing::instrument;

use clementine_core::{CartState, ProductId};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{CartView, StateChange};
use crate::services::CartError;
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    /// Defaults to one unit.
    pub quantity: Option<i64>,
}

/// Set quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Cart state transition request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStateRequest {
    pub state: String,
}

/// Display the caller's cart, creating it lazily on first access.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CartView>, AppError> {
    let view = state.cart_service().view_cart(user_id).await?;
    Ok(Json(view))
}

/// Add an item to the caller's cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>, AppError> {
    let quantity = body.quantity.unwrap_or(1);
    let view = state
        .cart_service()
        .add_item(user_id, body.product_id, quantity)
        .await?;
    Ok(Json(view))
}

/// Set a line's quantity to an absolute value.
#[instrument(skip(state))]
pub async fn set_quantity(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<SetQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let view = state
        .cart_service()
        .set_item_quantity(user_id, product_id, body.quantity)
        .await?;
    Ok(Json(view))
}

/// Remove a line from the caller's cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>, AppError> {
    let view = state.cart_service().remove_item(user_id, product_id).await?;
    Ok(Json(view))
}

/// Clear all items from the caller's cart.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CartView>, AppError> {
    let view = state.cart_service().clear(user_id).await?;
    Ok(Json(view))
}

/// Transition the caller's active cart to a new lifecycle state.
#[instrument(skip(state))]
pub async fn set_state(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<SetStateRequest>,
) -> Result<Json<StateChange>, AppError> {
    let new_state = body
        .state
        .parse::<CartState>()
        .map_err(CartError::InvalidState)?;
    let change = state.cart_service().set_cart_state(user_id, new_state).await?;
    Ok(Json(change))
}
