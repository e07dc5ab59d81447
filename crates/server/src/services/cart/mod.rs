//! Cart domain service.
//!
//! All cart business rules live here: quantity validation, stock-aware
//! merge semantics, total computation, and lifecycle transitions. The
//! service is the only caller of the cart store and the product catalog,
//! and both arrive through constructor injection so tests can substitute
//! in-memory fakes.
//!
//! Stock is read from the catalog and never reserved: a stock decrease
//! between the check and the write is an accepted race, re-checked
//! authoritatively at checkout (out of scope here).

mod error;

pub use error::CartError;

use rust_decimal::Decimal;

use clementine_core::{CartId, CartState, LineItemId, ProductId, Quantity, UserId};

use crate::db::RepositoryError;
use crate::models::{Cart, CartLine, CartView, LineWithProduct, PricedLine, Product, StateChange};

/// Durable state for carts and line items. No business rules.
#[allow(async_fn_in_trait)]
pub trait CartStore {
    /// The user's `Active` cart, if any.
    async fn active_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// The user's `Active` cart, created if absent. Concurrent callers for
    /// the same user must never both create a cart.
    async fn get_or_create_active_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError>;

    /// The user's `Active` cart joined with its lines and their product
    /// attributes (name, description, live price, live stock).
    async fn cart_with_lines(
        &self,
        user_id: UserId,
    ) -> Result<Option<(Cart, Vec<LineWithProduct>)>, RepositoryError>;

    /// The line for `(cart_id, product_id)`, if any.
    async fn line_for_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// Replace the line's quantity with `quantity`, inserting the line if
    /// absent. A replace, not an increment.
    async fn upsert_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError>;

    /// Atomically add `added` to the line's quantity (creating the line at
    /// `added`), unless the result would exceed `bound`. Concurrent calls
    /// must not lose increments.
    async fn merge_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        added: i32,
        bound: i32,
    ) -> Result<MergeOutcome, RepositoryError>;

    /// Delete a line by ID. `NotFound` if it does not exist.
    async fn delete_line(&self, line_id: LineItemId) -> Result<(), RepositoryError>;

    /// Delete all lines of a cart.
    async fn delete_all_lines(&self, cart_id: CartId) -> Result<(), RepositoryError>;

    /// Set a cart's lifecycle state. `NotFound` if the cart does not exist.
    async fn set_state(&self, cart_id: CartId, state: CartState) -> Result<(), RepositoryError>;

    /// Quantity/price pairs for all lines of a cart, at live prices.
    async fn priced_lines(&self, cart_id: CartId) -> Result<Vec<PricedLine>, RepositoryError>;
}

/// Read-only view of the product catalog.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    /// Look up a product by ID.
    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError>;
}

/// Result of an atomic bounded merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The line now holds `quantity` units.
    Merged { quantity: i32 },
    /// The merge would have pushed the line past the bound; `current` is the
    /// line's unchanged quantity (0 if the line does not exist).
    WouldExceedBound { current: i32 },
}

/// Cart domain service.
///
/// Generic over its collaborators so the Postgres repositories can be
/// swapped for in-memory fakes in tests.
pub struct CartService<S, C> {
    store: S,
    catalog: C,
}

impl<S: CartStore, C: ProductCatalog> CartService<S, C> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    /// The user's cart view, creating an empty active cart on first access.
    ///
    /// A freshly created cart yields `items=[]` and `total=0`; this is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on storage failure.
    pub async fn view_cart(&self, user_id: UserId) -> Result<CartView, CartError> {
        self.store.get_or_create_active_cart(user_id).await?;
        self.assemble_view(user_id).await
    }

    /// Add `requested` units of a product to the user's cart.
    ///
    /// Repeated adds for the same product merge into one line. The merged
    /// quantity is bounded by the product's current stock; the increment and
    /// the bound check are one atomic store operation, so concurrent adds
    /// cannot lose an increment or overshoot the bound.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a non-positive quantity,
    /// `CartError::ProductNotFound` for an unknown product, and
    /// `CartError::InsufficientStock` when the merged quantity would exceed
    /// stock (carrying available/in-cart/requested for diagnostics). Failed
    /// calls leave the cart unchanged.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        requested: i64,
    ) -> Result<CartView, CartError> {
        let quantity = Quantity::parse(requested)?;
        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let cart = self.store.get_or_create_active_cart(user_id).await?;

        // The requested amount alone exceeds stock: fail before touching the
        // line. The merged-quantity bound is enforced inside merge_line.
        if quantity.as_i32() > product.stock {
            let in_cart = self
                .store
                .line_for_product(cart.id, product_id)
                .await?
                .map_or(0, |line| line.quantity);
            return Err(CartError::InsufficientStock {
                product_id,
                available: product.stock,
                in_cart,
                requested: quantity.as_i32(),
            });
        }

        match self
            .store
            .merge_line(cart.id, product_id, quantity.as_i32(), product.stock)
            .await?
        {
            MergeOutcome::Merged { .. } => self.assemble_view(user_id).await,
            MergeOutcome::WouldExceedBound { current } => Err(CartError::InsufficientStock {
                product_id,
                available: product.stock,
                in_cart: current,
                requested: quantity.as_i32(),
            }),
        }
    }

    /// Set a line's quantity to an absolute value. Never creates a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a non-positive quantity,
    /// `CartError::ProductNotFound` for an unknown product,
    /// `CartError::InsufficientStock` when the quantity exceeds stock, and
    /// `CartError::CartNotFound`/`CartError::LineNotFound` when there is
    /// nothing to update.
    pub async fn set_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        requested: i64,
    ) -> Result<CartView, CartError> {
        let quantity = Quantity::parse(requested)?;
        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        if quantity.as_i32() > product.stock {
            let in_cart = self.quantity_in_active_cart(user_id, product_id).await?;
            return Err(CartError::InsufficientStock {
                product_id,
                available: product.stock,
                in_cart,
                requested: quantity.as_i32(),
            });
        }

        let cart = self
            .store
            .active_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound(user_id))?;

        if self
            .store
            .line_for_product(cart.id, product_id)
            .await?
            .is_none()
        {
            return Err(CartError::LineNotFound(product_id));
        }

        self.store
            .upsert_line(cart.id, product_id, quantity.as_i32())
            .await?;
        self.assemble_view(user_id).await
    }

    /// Remove a product's line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` when the user has no active cart
    /// and `CartError::LineNotFound` when the product has no line.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartView, CartError> {
        let cart = self
            .store
            .active_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound(user_id))?;
        let line = self
            .store
            .line_for_product(cart.id, product_id)
            .await?
            .ok_or(CartError::LineNotFound(product_id))?;

        match self.store.delete_line(line.id).await {
            Ok(()) => self.assemble_view(user_id).await,
            // Deleted out from under us; same observable outcome as a miss.
            Err(RepositoryError::NotFound) => Err(CartError::LineNotFound(product_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete all lines from the user's cart, creating the cart if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on storage failure.
    pub async fn clear(&self, user_id: UserId) -> Result<CartView, CartError> {
        let cart = self.store.get_or_create_active_cart(user_id).await?;
        self.store.delete_all_lines(cart.id).await?;
        self.assemble_view(user_id).await
    }

    /// Transition the user's active cart to `state`.
    ///
    /// Only the active cart is addressable through this API, so terminal
    /// states are structurally final: once a cart is `Converted` or
    /// `Abandoned` it can never be reached for another transition, and the
    /// next cart access creates a fresh active cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on storage failure.
    pub async fn set_cart_state(
        &self,
        user_id: UserId,
        state: CartState,
    ) -> Result<StateChange, CartError> {
        let cart = self.store.get_or_create_active_cart(user_id).await?;

        match self.store.set_state(cart.id, state).await {
            Ok(()) => Ok(StateChange {
                cart_id: cart.id,
                state,
            }),
            Err(RepositoryError::NotFound) => Err(CartError::CartNotFound(user_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Sum of `quantity × price` over all lines of a cart, at live prices.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on storage failure.
    pub async fn total(&self, cart_id: CartId) -> Result<Decimal, CartError> {
        let lines = self.store.priced_lines(cart_id).await?;
        Ok(lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum())
    }

    async fn assemble_view(&self, user_id: UserId) -> Result<CartView, CartError> {
        let (cart, lines) = self
            .store
            .cart_with_lines(user_id)
            .await?
            .ok_or(CartError::CartNotFound(user_id))?;
        Ok(CartView::assemble(&cart, lines))
    }

    async fn quantity_in_active_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<i32, CartError> {
        let Some(cart) = self.store.active_cart(user_id).await? else {
            return Ok(0);
        };
        Ok(self
            .store
            .line_for_product(cart.id, product_id)
            .await?
            .map_or(0, |line| line.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use clementine_core::LineItemId;

    use super::*;

    // =========================================================================
    // In-memory fakes
    // =========================================================================

    struct FakeCatalog {
        products: HashMap<ProductId, Product>,
    }

    impl ProductCatalog for FakeCatalog {
        async fn find_by_id(
            &self,
            product_id: ProductId,
        ) -> Result<Option<Product>, RepositoryError> {
            Ok(self.products.get(&product_id).cloned())
        }
    }

    #[derive(Default)]
    struct StoreState {
        carts: Vec<Cart>,
        lines: Vec<CartLine>,
        next_cart_id: i32,
        next_line_id: i32,
    }

    struct FakeStore {
        products: HashMap<ProductId, Product>,
        state: Mutex<StoreState>,
    }

    impl FakeStore {
        fn new(products: HashMap<ProductId, Product>) -> Self {
            Self {
                products,
                state: Mutex::new(StoreState {
                    next_cart_id: 1,
                    next_line_id: 1,
                    ..StoreState::default()
                }),
            }
        }
    }

    impl CartStore for FakeStore {
        async fn active_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .carts
                .iter()
                .find(|c| c.user_id == user_id && c.state == CartState::Active)
                .cloned())
        }

        async fn get_or_create_active_cart(
            &self,
            user_id: UserId,
        ) -> Result<Cart, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            if let Some(cart) = state
                .carts
                .iter()
                .find(|c| c.user_id == user_id && c.state == CartState::Active)
            {
                return Ok(cart.clone());
            }

            let cart = Cart {
                id: CartId::new(state.next_cart_id),
                user_id,
                created_at: Utc::now(),
                state: CartState::Active,
            };
            state.next_cart_id += 1;
            state.carts.push(cart.clone());
            Ok(cart)
        }

        async fn cart_with_lines(
            &self,
            user_id: UserId,
        ) -> Result<Option<(Cart, Vec<LineWithProduct>)>, RepositoryError> {
            let state = self.state.lock().unwrap();
            let Some(cart) = state
                .carts
                .iter()
                .find(|c| c.user_id == user_id && c.state == CartState::Active)
                .cloned()
            else {
                return Ok(None);
            };

            let mut lines = Vec::new();
            for line in state.lines.iter().filter(|l| l.cart_id == cart.id) {
                let product = self.products.get(&line.product_id).ok_or_else(|| {
                    RepositoryError::DataCorruption("line references missing product".to_owned())
                })?;
                lines.push(LineWithProduct {
                    line: line.clone(),
                    name: product.name.clone(),
                    description: product.description.clone(),
                    price: product.price,
                    stock: product.stock,
                });
            }
            Ok(Some((cart, lines)))
        }

        async fn line_for_product(
            &self,
            cart_id: CartId,
            product_id: ProductId,
        ) -> Result<Option<CartLine>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .lines
                .iter()
                .find(|l| l.cart_id == cart_id && l.product_id == product_id)
                .cloned())
        }

        async fn upsert_line(
            &self,
            cart_id: CartId,
            product_id: ProductId,
            quantity: i32,
        ) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            if let Some(line) = state
                .lines
                .iter_mut()
                .find(|l| l.cart_id == cart_id && l.product_id == product_id)
            {
                line.quantity = quantity;
                return Ok(());
            }

            let id = LineItemId::new(state.next_line_id);
            state.next_line_id += 1;
            state.lines.push(CartLine {
                id,
                cart_id,
                product_id,
                quantity,
            });
            Ok(())
        }

        async fn merge_line(
            &self,
            cart_id: CartId,
            product_id: ProductId,
            added: i32,
            bound: i32,
        ) -> Result<MergeOutcome, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            if let Some(line) = state
                .lines
                .iter_mut()
                .find(|l| l.cart_id == cart_id && l.product_id == product_id)
            {
                if line.quantity + added > bound {
                    return Ok(MergeOutcome::WouldExceedBound {
                        current: line.quantity,
                    });
                }
                line.quantity += added;
                return Ok(MergeOutcome::Merged {
                    quantity: line.quantity,
                });
            }

            let id = LineItemId::new(state.next_line_id);
            state.next_line_id += 1;
            state.lines.push(CartLine {
                id,
                cart_id,
                product_id,
                quantity: added,
            });
            Ok(MergeOutcome::Merged { quantity: added })
        }

        async fn delete_line(&self, line_id: LineItemId) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            let before = state.lines.len();
            state.lines.retain(|l| l.id != line_id);
            if state.lines.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }

        async fn delete_all_lines(&self, cart_id: CartId) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            state.lines.retain(|l| l.cart_id != cart_id);
            Ok(())
        }

        async fn set_state(
            &self,
            cart_id: CartId,
            new_state: CartState,
        ) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            let cart = state
                .carts
                .iter_mut()
                .find(|c| c.id == cart_id)
                .ok_or(RepositoryError::NotFound)?;
            cart.state = new_state;
            Ok(())
        }

        async fn priced_lines(&self, cart_id: CartId) -> Result<Vec<PricedLine>, RepositoryError> {
            let state = self.state.lock().unwrap();
            let mut lines = Vec::new();
            for line in state.lines.iter().filter(|l| l.cart_id == cart_id) {
                let product = self.products.get(&line.product_id).ok_or_else(|| {
                    RepositoryError::DataCorruption("line references missing product".to_owned())
                })?;
                lines.push(PricedLine {
                    quantity: line.quantity,
                    price: product.price,
                });
            }
            Ok(lines)
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    const USER: UserId = UserId::new(7);
    const PRODUCT_A: ProductId = ProductId::new(1);
    const PRODUCT_B: ProductId = ProductId::new(2);
    const UNKNOWN_PRODUCT: ProductId = ProductId::new(99);

    fn product(id: ProductId, price: &str, stock: i32) -> Product {
        Product {
            id,
            name: format!("product {id}"),
            description: String::new(),
            price: price.parse().unwrap(),
            stock,
        }
    }

    /// Product A: price 10.00, stock 5. Product B: price 2.50, stock 10.
    fn service() -> CartService<FakeStore, FakeCatalog> {
        let products: HashMap<ProductId, Product> = [
            (PRODUCT_A, product(PRODUCT_A, "10.00", 5)),
            (PRODUCT_B, product(PRODUCT_B, "2.50", 10)),
        ]
        .into();

        CartService::new(
            FakeStore::new(products.clone()),
            FakeCatalog { products },
        )
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_view_cart_new_user_returns_empty_view() {
        let svc = service();

        let view = svc.view_cart(USER).await.unwrap();

        assert!(view.items.is_empty());
        assert_eq!(view.total, Decimal::ZERO);
        assert_eq!(view.item_count, 0);
        assert_eq!(view.unit_count, 0);
        assert_eq!(view.state, CartState::Active);
        assert_eq!(view.user_id, USER);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let svc = service();

        let first = svc.view_cart(USER).await.unwrap();
        let second = svc.view_cart(USER).await.unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_add_item_merges_into_single_line() {
        let svc = service();

        svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        let view = svc.add_item(USER, PRODUCT_A, 3).await.unwrap();

        assert_eq!(view.item_count, 1);
        assert_eq!(view.items[0].quantity, 5);
        assert_eq!(view.total, dec("50.00"));
    }

    #[tokio::test]
    async fn test_add_item_scenario_merge_then_stock_bound() {
        // User 7, product A: price 10.00, stock 5.
        let svc = service();

        let view = svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.total, dec("20.00"));

        let view = svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        assert_eq!(view.items[0].quantity, 4);
        assert_eq!(view.total, dec("40.00"));

        // Third add would merge to 6 > 5.
        let err = svc.add_item(USER, PRODUCT_A, 2).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock {
                available: 5,
                in_cart: 4,
                requested: 2,
                ..
            }
        ));

        // State unchanged.
        let view = svc.view_cart(USER).await.unwrap();
        assert_eq!(view.items[0].quantity, 4);
        assert_eq!(view.total, dec("40.00"));
    }

    #[tokio::test]
    async fn test_add_item_requested_alone_exceeds_stock() {
        let svc = service();

        let err = svc.add_item(USER, PRODUCT_A, 6).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock {
                available: 5,
                in_cart: 0,
                requested: 6,
                ..
            }
        ));

        let view = svc.view_cart(USER).await.unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_add_item_rejects_non_positive_quantity() {
        let svc = service();

        assert!(matches!(
            svc.add_item(USER, PRODUCT_A, 0).await.unwrap_err(),
            CartError::InvalidQuantity(_)
        ));
        assert!(matches!(
            svc.add_item(USER, PRODUCT_A, -2).await.unwrap_err(),
            CartError::InvalidQuantity(_)
        ));
    }

    #[tokio::test]
    async fn test_add_item_unknown_product() {
        let svc = service();

        assert!(matches!(
            svc.add_item(USER, UNKNOWN_PRODUCT, 1).await.unwrap_err(),
            CartError::ProductNotFound(id) if id == UNKNOWN_PRODUCT
        ));
    }

    #[tokio::test]
    async fn test_set_item_quantity_is_absolute_not_merge() {
        let svc = service();

        svc.add_item(USER, PRODUCT_A, 4).await.unwrap();
        let view = svc.set_item_quantity(USER, PRODUCT_A, 5).await.unwrap();

        // Exactly 5, not 9.
        assert_eq!(view.items[0].quantity, 5);
        assert_eq!(view.total, dec("50.00"));
    }

    #[tokio::test]
    async fn test_set_item_quantity_enforces_stock_bound() {
        let svc = service();

        svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        let err = svc.set_item_quantity(USER, PRODUCT_A, 6).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::InsufficientStock {
                available: 5,
                in_cart: 2,
                requested: 6,
                ..
            }
        ));

        let view = svc.view_cart(USER).await.unwrap();
        assert_eq!(view.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_set_item_quantity_never_creates_a_line() {
        let svc = service();

        // No cart at all.
        assert!(matches!(
            svc.set_item_quantity(USER, PRODUCT_A, 1).await.unwrap_err(),
            CartError::CartNotFound(user) if user == USER
        ));

        // Cart exists but has no line for the product.
        svc.add_item(USER, PRODUCT_B, 1).await.unwrap();
        assert!(matches!(
            svc.set_item_quantity(USER, PRODUCT_A, 1).await.unwrap_err(),
            CartError::LineNotFound(id) if id == PRODUCT_A
        ));

        let view = svc.view_cart(USER).await.unwrap();
        assert_eq!(view.item_count, 1);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let svc = service();

        svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        svc.add_item(USER, PRODUCT_B, 1).await.unwrap();

        let view = svc.remove_item(USER, PRODUCT_A).await.unwrap();
        assert_eq!(view.item_count, 1);
        assert_eq!(view.items[0].product_id, PRODUCT_B);
        assert_eq!(view.total, dec("2.50"));
    }

    #[tokio::test]
    async fn test_remove_item_missing_line() {
        let svc = service();

        assert!(matches!(
            svc.remove_item(USER, PRODUCT_A).await.unwrap_err(),
            CartError::CartNotFound(_)
        ));

        svc.add_item(USER, PRODUCT_B, 1).await.unwrap();
        assert!(matches!(
            svc.remove_item(USER, PRODUCT_A).await.unwrap_err(),
            CartError::LineNotFound(id) if id == PRODUCT_A
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let svc = service();

        svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        svc.add_item(USER, PRODUCT_B, 3).await.unwrap();

        let view = svc.clear(USER).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.total, Decimal::ZERO);

        let view = svc.view_cart(USER).await.unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_clear_for_brand_new_user() {
        let svc = service();

        let view = svc.clear(USER).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_total_is_recomputed_from_live_prices() {
        let svc = service();

        svc.add_item(USER, PRODUCT_A, 2).await.unwrap();
        let view = svc.add_item(USER, PRODUCT_B, 4).await.unwrap();

        // 2 × 10.00 + 4 × 2.50
        assert_eq!(view.total, dec("30.00"));
        assert_eq!(view.unit_count, 6);
        assert_eq!(view.item_count, 2);

        let total = svc.total(view.id).await.unwrap();
        assert_eq!(total, view.total);
    }

    #[tokio::test]
    async fn test_set_cart_state_converts_active_cart() {
        let svc = service();

        let view = svc.add_item(USER, PRODUCT_A, 1).await.unwrap();
        let change = svc.set_cart_state(USER, CartState::Converted).await.unwrap();

        assert_eq!(change.cart_id, view.id);
        assert_eq!(change.state, CartState::Converted);
    }

    #[tokio::test]
    async fn test_terminal_cart_is_no_longer_addressable() {
        let svc = service();

        let converted = svc.view_cart(USER).await.unwrap();
        svc.set_cart_state(USER, CartState::Converted).await.unwrap();

        // The next access creates a fresh active cart; the converted cart
        // can never transition again through this API.
        let fresh = svc.view_cart(USER).await.unwrap();
        assert_ne!(fresh.id, converted.id);
        assert_eq!(fresh.state, CartState::Active);
    }

    #[tokio::test]
    async fn test_set_cart_state_creates_cart_if_absent() {
        let svc = service();

        let change = svc.set_cart_state(USER, CartState::Abandoned).await.unwrap();
        assert_eq!(change.state, CartState::Abandoned);
    }
}
