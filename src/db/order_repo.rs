// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        fulfillment::FulfillmentState,
        orders::{Order, OrderLineItem, OrderStatus, OrderTotals},
    },
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ORDER CREATION (always inside the allocation transaction)
    // =========================================================================

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        email: &str,
        shipping_address: Option<&serde_json::Value>,
        currency: &str,
        totals: &OrderTotals,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                status, email, shipping_address, currency,
                subtotal_cents, tax_cents, shipping_cents, total_cents
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(OrderStatus::Received)
        .bind(email)
        .bind(shipping_address)
        .bind(currency)
        .bind(totals.subtotal_cents)
        .bind(totals.tax_cents)
        .bind(totals.shipping_cents)
        .bind(totals.total_cents)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn insert_line_item<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        item_id: i64,
        title_snapshot: &str,
        unit_price_cents_snapshot: i64,
        quantity: i32,
    ) -> Result<OrderLineItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let line = sqlx::query_as::<_, OrderLineItem>(
            r#"
            INSERT INTO order_line_items (
                order_id, item_id, title_snapshot, unit_price_cents_snapshot, quantity
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(item_id)
        .bind(title_snapshot)
        .bind(unit_price_cents_snapshot)
        .bind(quantity)
        .fetch_one(executor)
        .await?;

        Ok(line)
    }

    /// Inserts `count` units for one line in a single set-based statement.
    /// `now()` is the transaction start time, so every unit of the order shares
    /// one `queued_at` and ids keep the insertion sequence.
    pub async fn insert_units<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        line_item_id: i64,
        item_id: i64,
        state: FulfillmentState,
        count: i32,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if count <= 0 {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO fulfillment_units (order_id, order_line_item_id, item_id, state, queued_at)
            SELECT $1, $2, $3, $4, now()
            FROM generate_series(1, $5)
            "#,
        )
        .bind(order_id)
        .bind(line_item_id)
        .bind(item_id)
        .bind(state)
        .bind(count)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  STATUS
    // =========================================================================

    /// Row lock on the order. Taken after the unit lock by every shipment.
    pub async fn lock_order<'e, E>(&self, executor: E, order_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_one(executor)
            .await?;
        Ok(())
    }

    /// Refreshes `updated_at` and, when `complete` is set, moves the order to
    /// COMPLETE. Returns the resulting status.
    pub async fn refresh_status<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        complete: bool,
    ) -> Result<OrderStatus, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status: OrderStatus = sqlx::query_scalar(
            r#"
            UPDATE orders
            SET status = CASE WHEN $2 THEN 'COMPLETE'::order_status ELSE status END,
                updated_at = now()
            WHERE id = $1
            RETURNING status
            "#,
        )
        .bind(order_id)
        .bind(complete)
        .fetch_one(executor)
        .await?;

        Ok(status)
    }

    // =========================================================================
    //  READS
    // =========================================================================

    pub async fn list_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, AppError> {
        let lines = sqlx::query_as::<_, OrderLineItem>(
            "SELECT * FROM order_line_items WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }
}
