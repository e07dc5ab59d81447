//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; the repositories map rows into them at the query boundary.

pub mod cart;
pub mod product;

pub use cart::{Cart, CartItemView, CartLine, CartView, LineWithProduct, PricedLine, StateChange};
pub use product::Product;
