//! Shared type definitions.

pub mod cart_state;
pub mod id;
pub mod quantity;

pub use cart_state::{CartState, CartStateError};
pub use id::{CartId, LineItemId, ProductId, UserId};
pub use quantity::{Quantity, QuantityError};
