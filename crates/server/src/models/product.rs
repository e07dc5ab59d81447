//! Catalog domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::ProductId;

/// A catalog product.
///
/// The cart subsystem treats this as read-only: price and stock are
/// authoritative in the catalog and are never mutated by cart operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Current unit price.
    pub price: Decimal,
    /// Units currently available.
    pub stock: i32,
}
