//! Cart domain types and the denormalized cart view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::{CartId, CartState, LineItemId, ProductId, UserId};

/// A shopping cart (domain type).
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// Lifecycle state.
    pub state: CartState,
}

/// A cart line item (domain type).
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Unique line ID.
    pub id: LineItemId,
    /// Cart this line belongs to.
    pub cart_id: CartId,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Units of the product in the cart. Always positive.
    pub quantity: i32,
}

/// A line item joined with the product attributes needed for presentation.
#[derive(Debug, Clone)]
pub struct LineWithProduct {
    pub line: CartLine,
    pub name: String,
    pub description: String,
    /// Live catalog price at read time.
    pub price: Decimal,
    /// Live catalog stock at read time.
    pub stock: i32,
}

/// Quantity/price pair for total computation.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub quantity: i32,
    pub price: Decimal,
}

/// The denormalized cart view returned by every cart operation.
///
/// Totals are recomputed from live catalog prices on every read; nothing
/// here is cached in the cart record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub state: CartState,
    pub items: Vec<CartItemView>,
    /// Sum of line subtotals.
    pub total: Decimal,
    /// Number of distinct line items.
    pub item_count: u32,
    /// Total units across all lines.
    pub unit_count: u32,
}

/// One line of the cart view, enriched with live product data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub line_id: LineItemId,
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub stock_available: i32,
    pub subtotal: Decimal,
    /// Whether current stock still covers the line's quantity.
    pub has_stock: bool,
}

/// Result of a cart state change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    pub cart_id: CartId,
    pub state: CartState,
}

impl CartView {
    /// Build the view from a cart and its product-joined lines.
    #[must_use]
    pub fn assemble(cart: &Cart, lines: Vec<LineWithProduct>) -> Self {
        let items: Vec<CartItemView> = lines.into_iter().map(CartItemView::from).collect();
        let total = items.iter().map(|item| item.subtotal).sum();
        let unit_count = items
            .iter()
            .map(|item| u32::try_from(item.quantity).unwrap_or(0))
            .sum();
        let item_count = u32::try_from(items.len()).unwrap_or(u32::MAX);

        Self {
            id: cart.id,
            user_id: cart.user_id,
            created_at: cart.created_at,
            state: cart.state,
            items,
            total,
            item_count,
            unit_count,
        }
    }
}

impl From<LineWithProduct> for CartItemView {
    fn from(joined: LineWithProduct) -> Self {
        let subtotal = joined.price * Decimal::from(joined.line.quantity);
        Self {
            line_id: joined.line.id,
            product_id: joined.line.product_id,
            name: joined.name,
            description: joined.description,
            price: joined.price,
            quantity: joined.line.quantity,
            stock_available: joined.stock,
            subtotal,
            has_stock: joined.stock >= joined.line.quantity,
        }
    }
}
