//! Cart repository for durable cart and line-item state.
//!
//! This layer holds no business rules: stock validation and merge arithmetic
//! live in the cart domain service. What it does own are the two write-side
//! concurrency guarantees:
//!
//! - at most one `active` cart per user, via the `cart_one_active_per_user`
//!   partial unique index plus insert-or-reread in
//!   [`get_or_create_active_cart`](CartRepository::get_or_create_active_cart);
//! - no lost increments on concurrent adds, via the single-statement bounded
//!   merge in [`merge_line`](CartRepository::merge_line).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::{CartId, CartState, LineItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine, LineWithProduct, PricedLine};
use crate::services::cart::{CartStore, MergeOutcome};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    state: String,
}

impl CartRow {
    fn into_cart(self) -> Result<Cart, RepositoryError> {
        let state = self.state.parse::<CartState>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cart state in database: {e}"))
        })?;

        Ok(Cart {
            id: self.id,
            user_id: self.user_id,
            created_at: self.created_at,
            state,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    id: LineItemId,
    cart_id: CartId,
    product_id: ProductId,
    quantity: i32,
}

impl From<LineRow> for CartLine {
    fn from(row: LineRow) -> Self {
        Self {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

/// One row of the cart/line/product join. Line columns are NULL for a cart
/// with no lines.
#[derive(sqlx::FromRow)]
struct JoinedRow {
    cart_id: CartId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    state: String,
    line_id: Option<LineItemId>,
    product_id: Option<ProductId>,
    quantity: Option<i32>,
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct PricedLineRow {
    quantity: i32,
    price: Decimal,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_active_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id, created_at, state
            FROM cart
            WHERE user_id = $1 AND state = 'active'
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartRow::into_cart).transpose()
    }
}

impl CartStore for CartRepository<'_> {
    async fn active_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        self.fetch_active_cart(user_id).await
    }

    /// Returns the user's active cart, creating one if absent.
    ///
    /// Two concurrent callers race on the partial unique index: the loser's
    /// insert hits `ON CONFLICT DO NOTHING` and falls back to reading the
    /// winner's row, so a second active cart can never be created.
    async fn get_or_create_active_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.fetch_active_cart(user_id).await? {
            return Ok(cart);
        }

        let inserted = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO cart (user_id, state)
            VALUES ($1, 'active')
            ON CONFLICT (user_id) WHERE state = 'active' DO NOTHING
            RETURNING id, user_id, created_at, state
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return row.into_cart();
        }

        // Lost the creation race; the winner's row must exist now.
        self.fetch_active_cart(user_id).await?.ok_or_else(|| {
            RepositoryError::Conflict(format!("concurrent active-cart creation for user {user_id}"))
        })
    }

    async fn cart_with_lines(
        &self,
        user_id: UserId,
    ) -> Result<Option<(Cart, Vec<LineWithProduct>)>, RepositoryError> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            r"
            SELECT c.id AS cart_id, c.user_id, c.created_at, c.state,
                   l.id AS line_id, l.product_id, l.quantity,
                   p.name, p.description, p.price, p.stock
            FROM cart c
            LEFT JOIN cart_line l ON l.cart_id = c.id
            LEFT JOIN product p ON p.id = l.product_id
            WHERE c.user_id = $1 AND c.state = 'active'
            ORDER BY l.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let cart = CartRow {
            id: first.cart_id,
            user_id: first.user_id,
            created_at: first.created_at,
            state: first.state.clone(),
        }
        .into_cart()?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            // A cart with no lines joins to a single all-NULL line row.
            let (Some(line_id), Some(product_id), Some(quantity)) =
                (row.line_id, row.product_id, row.quantity)
            else {
                continue;
            };

            let (Some(name), Some(description), Some(price), Some(stock)) =
                (row.name, row.description, row.price, row.stock)
            else {
                return Err(RepositoryError::DataCorruption(format!(
                    "cart line {line_id} references missing product {product_id}"
                )));
            };

            lines.push(LineWithProduct {
                line: CartLine {
                    id: line_id,
                    cart_id: cart.id,
                    product_id,
                    quantity,
                },
                name,
                description,
                price,
                stock,
            });
        }

        Ok(Some((cart, lines)))
    }

    async fn line_for_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, LineRow>(
            r"
            SELECT id, cart_id, product_id, quantity
            FROM cart_line
            WHERE cart_id = $1 AND product_id = $2
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CartLine::from))
    }

    /// Replaces the line's quantity, inserting the line if absent.
    ///
    /// This is a plain replace; merge arithmetic belongs to the domain
    /// service.
    async fn upsert_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_line (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Atomically adds `added` units to the line, creating it if absent,
    /// unless the resulting quantity would exceed `bound`.
    ///
    /// The increment and the bound check execute in one statement, so two
    /// concurrent adds against the same line serialize on the row and
    /// neither increment is lost.
    async fn merge_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        added: i32,
        bound: i32,
    ) -> Result<MergeOutcome, RepositoryError> {
        let merged = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO cart_line (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_line.quantity + EXCLUDED.quantity
            WHERE cart_line.quantity + EXCLUDED.quantity <= $4
            RETURNING quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(added)
        .bind(bound)
        .fetch_optional(self.pool)
        .await?;

        if let Some(quantity) = merged {
            return Ok(MergeOutcome::Merged { quantity });
        }

        // Bound exceeded; read the current quantity for diagnostics.
        let current = sqlx::query_scalar::<_, i32>(
            r"
            SELECT quantity FROM cart_line
            WHERE cart_id = $1 AND product_id = $2
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?
        .unwrap_or(0);

        Ok(MergeOutcome::WouldExceedBound { current })
    }

    async fn delete_line(&self, line_id: LineItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_line WHERE id = $1")
            .bind(line_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_all_lines(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_line WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    async fn set_state(&self, cart_id: CartId, state: CartState) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart SET state = $2 WHERE id = $1")
            .bind(cart_id)
            .bind(state.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn priced_lines(&self, cart_id: CartId) -> Result<Vec<PricedLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, PricedLineRow>(
            r"
            SELECT l.quantity, p.price
            FROM cart_line l
            JOIN product p ON p.id = l.product_id
            WHERE l.cart_id = $1
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PricedLine {
                quantity: row.quantity,
                price: row.price,
            })
            .collect())
    }
}
