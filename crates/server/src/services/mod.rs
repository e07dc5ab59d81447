//! Business-rule services.

pub mod cart;

pub use cart::{CartError, CartService};
