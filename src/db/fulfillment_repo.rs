// src/db/fulfillment_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{error::AppError, pagination::Page},
    models::{
        fulfillment::{
            FulfillmentQueueRow, FulfillmentState, FulfillmentUnit, FulfillmentUnitDetail,
            OrderSummary,
        },
        orders::OrderStatus,
    },
};

/// Filters for [`FulfillmentRepository::order_summaries`], already validated.
#[derive(Debug, Clone, Default)]
pub struct SummaryFilter {
    pub status: Option<OrderStatus>,
    pub order_id: Option<i64>,
    pub email_query: Option<String>,
}

#[derive(Clone)]
pub struct FulfillmentRepository {
    pool: PgPool,
}

impl FulfillmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TRANSITIONS (transactional)
    // =========================================================================

    /// Row lock on one unit; a concurrent transition waits here and then sees
    /// the committed state.
    pub async fn find_unit_for_update<'e, E>(
        &self,
        executor: E,
        unit_id: i64,
    ) -> Result<Option<FulfillmentUnit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, FulfillmentUnit>(
            "SELECT * FROM fulfillment_units WHERE id = $1 FOR UPDATE",
        )
        .bind(unit_id)
        .fetch_optional(executor)
        .await?;
        Ok(unit)
    }

    pub async fn set_state<'e, E>(
        &self,
        executor: E,
        unit_id: i64,
        state: FulfillmentState,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE fulfillment_units SET state = $2 WHERE id = $1")
            .bind(unit_id)
            .bind(state)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Moves a unit to SHIPPED. Carrier and tracking fall back to the stored
    /// values, so an omitted field never erases an earlier one.
    pub async fn mark_shipped<'e, E>(
        &self,
        executor: E,
        unit_id: i64,
        carrier: Option<&str>,
        tracking_number: Option<&str>,
    ) -> Result<FulfillmentUnit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, FulfillmentUnit>(
            r#"
            UPDATE fulfillment_units
            SET state = 'SHIPPED',
                shipped_at = now(),
                carrier = COALESCE($2, carrier),
                tracking_number = COALESCE($3, tracking_number)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(unit_id)
        .bind(carrier)
        .bind(tracking_number)
        .fetch_one(executor)
        .await?;
        Ok(unit)
    }

    /// Live count, evaluated inside the caller's transaction.
    pub async fn count_unshipped<'e, E>(&self, executor: E, order_id: i64) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM fulfillment_units WHERE order_id = $1 AND state <> 'SHIPPED'",
        )
        .bind(order_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // =========================================================================
    //  QUERIES (no locks)
    // =========================================================================

    /// FIFO: oldest `queued_at` first, unit id as the stable tie-breaker.
    pub async fn queue(
        &self,
        state: FulfillmentState,
        page: Page,
    ) -> Result<Vec<FulfillmentQueueRow>, AppError> {
        let rows = sqlx::query_as::<_, FulfillmentQueueRow>(
            r#"
            SELECT
                fu.id AS unit_id,
                fu.state,
                fu.queued_at,
                fu.shipped_at,
                i.id AS item_id,
                i.title AS item_title,
                o.id AS order_id,
                o.email AS order_email,
                o.shipping_address,
                oli.id AS line_item_id,
                oli.title_snapshot AS line_item_title_snapshot
            FROM fulfillment_units fu
            JOIN items i ON i.id = fu.item_id
            JOIN orders o ON o.id = fu.order_id
            JOIN order_line_items oli ON oli.id = fu.order_line_item_id
            WHERE fu.state = $1
            ORDER BY fu.queued_at ASC, fu.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(state)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Newest orders first, each with its unit counts per state.
    pub async fn order_summaries(
        &self,
        filter: &SummaryFilter,
        page: Page,
    ) -> Result<Vec<OrderSummary>, AppError> {
        let email_pattern = filter
            .email_query
            .as_deref()
            .map(|q| format!("%{}%", escape_like(q)));

        let rows = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id AS order_id,
                o.status AS order_status,
                o.email AS order_email,
                o.shipping_address,
                o.currency,
                o.subtotal_cents,
                o.tax_cents,
                o.shipping_cents,
                o.total_cents,
                o.created_at,
                o.updated_at,
                COUNT(fu.id) AS total_units,
                COUNT(fu.id) FILTER (WHERE fu.state = 'NEEDS_CREATED') AS needs_created_units,
                COUNT(fu.id) FILTER (WHERE fu.state = 'NEEDS_SHIPPED') AS needs_shipped_units,
                COUNT(fu.id) FILTER (WHERE fu.state = 'SHIPPED') AS shipped_units
            FROM orders o
            LEFT JOIN fulfillment_units fu ON fu.order_id = o.id
            WHERE ($1::order_status IS NULL OR o.status = $1)
              AND ($2::bigint IS NULL OR o.id = $2)
              AND ($3::text IS NULL OR o.email ILIKE $3 ESCAPE '\')
            GROUP BY o.id
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.status)
        .bind(filter.order_id)
        .bind(email_pattern)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Units of one order, grouped by line item then FIFO within the line.
    pub async fn units_for_order(&self, order_id: i64) -> Result<Vec<FulfillmentUnitDetail>, AppError> {
        let rows = sqlx::query_as::<_, FulfillmentUnitDetail>(
            r#"
            SELECT
                fu.id AS unit_id,
                fu.state,
                fu.queued_at,
                fu.shipped_at,
                fu.carrier,
                fu.tracking_number,
                i.id AS item_id,
                i.title AS item_title,
                oli.id AS line_item_id,
                oli.title_snapshot AS line_item_title_snapshot
            FROM fulfillment_units fu
            JOIN items i ON i.id = fu.item_id
            JOIN order_line_items oli ON oli.id = fu.order_line_item_id
            WHERE fu.order_id = $1
            ORDER BY oli.id ASC, fu.queued_at ASC, fu.id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Makes user input match literally inside an `ILIKE ... ESCAPE '\'` pattern.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
