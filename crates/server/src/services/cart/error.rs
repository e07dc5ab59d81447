//! Cart error types.

use thiserror::Error;

use clementine_core::{CartStateError, ProductId, QuantityError, UserId};

use crate::db::RepositoryError;

/// Errors that can occur during cart operations.
///
/// Variants fall into three classes that the HTTP layer maps onto status
/// codes: validation failures, missing entities, and storage failures.
#[derive(Debug, Error)]
pub enum CartError {
    /// Zero, negative, or out-of-range quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The write would push the line's quantity past the product's stock.
    #[error(
        "insufficient stock for product {product_id}: \
         {requested} requested, {in_cart} already in cart, {available} available"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: i32,
        in_cart: i32,
        requested: i32,
    },

    /// Unrecognized cart state value.
    #[error("invalid cart state: {0}")]
    InvalidState(#[from] CartStateError),

    /// Product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// User has no active cart.
    #[error("no active cart for user {0}")]
    CartNotFound(UserId),

    /// The product has no line in the active cart.
    #[error("product {0} is not in the cart")]
    LineNotFound(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
