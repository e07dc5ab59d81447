//! Catalog route handlers.
//!
//! Read-only pass-through over the product repository. Catalog management
//! (create/update, categories, stock adjustments) lives in the admin
//! tooling, not here.

use axum::{Json, extract::Path, extract::State};
use tracing::instrument;

use clementine_core::ProductId;

use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products().list().await?;
    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}
