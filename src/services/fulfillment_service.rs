// src/services/fulfillment_service.rs

use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{PageLimits, PageParams},
        validation::ensure_positive_id,
    },
    db::{FulfillmentRepository, OrderRepository, SummaryFilter},
    models::{
        fulfillment::{
            CreatedDoneResult, FulfillmentQueueRow, FulfillmentState, FulfillmentUnit,
            FulfillmentUnitDetail, OrderDetail, OrderLineItemDetail, OrderSummary,
            OrderSummaryQuery, QueueQuery, ShippedResult,
        },
        orders::OrderLineItem,
    },
};

/// Unit state machine plus the read-side views staff work from.
#[derive(Clone)]
pub struct FulfillmentService {
    fulfillment_repo: FulfillmentRepository,
    order_repo: OrderRepository,
    pool: PgPool,
    page_limits: PageLimits,
}

impl FulfillmentService {
    pub fn new(
        fulfillment_repo: FulfillmentRepository,
        order_repo: OrderRepository,
        pool: PgPool,
        page_limits: PageLimits,
    ) -> Self {
        Self { fulfillment_repo, order_repo, pool, page_limits }
    }

    // =========================================================================
    //  TRANSITIONS
    // =========================================================================

    /// NEEDS_CREATED -> NEEDS_SHIPPED: the piece has been made. The order is untouched.
    pub async fn mark_created_done(&self, unit_id: i64) -> Result<CreatedDoneResult, AppError> {
        ensure_positive_id("unitId", unit_id)?;

        let mut tx = self.pool.begin().await?;

        let unit = self
            .fulfillment_repo
            .find_unit_for_update(&mut *tx, unit_id)
            .await?
            .ok_or(AppError::UnitNotFound(unit_id))?;
        let new_state = guard_transition(&unit, FulfillmentState::NeedsShipped)?;

        self.fulfillment_repo.set_state(&mut *tx, unit_id, new_state).await?;

        tx.commit().await?;
        tracing::info!(unit_id, order_id = unit.order_id, "unit marked created");

        Ok(CreatedDoneResult { unit_id, new_state })
    }

    /// NEEDS_SHIPPED -> SHIPPED, then recompute the owning order's status from a
    /// fresh count in the same transaction, under the order's row lock.
    pub async fn mark_shipped(
        &self,
        unit_id: i64,
        carrier: Option<&str>,
        tracking_number: Option<&str>,
    ) -> Result<ShippedResult, AppError> {
        ensure_positive_id("unitId", unit_id)?;

        let mut tx = self.pool.begin().await?;

        let unit = self
            .fulfillment_repo
            .find_unit_for_update(&mut *tx, unit_id)
            .await?
            .ok_or(AppError::UnitNotFound(unit_id))?;
        let new_state = guard_transition(&unit, FulfillmentState::Shipped)?;

        // Serializes shippers of the same order so the count below sees every
        // sibling that committed first. Unit lock, then order lock, always.
        self.order_repo.lock_order(&mut *tx, unit.order_id).await?;

        let shipped = self
            .fulfillment_repo
            .mark_shipped(&mut *tx, unit_id, carrier, tracking_number)
            .await?;

        let unshipped = self.fulfillment_repo.count_unshipped(&mut *tx, shipped.order_id).await?;
        let order_status = self
            .order_repo
            .refresh_status(&mut *tx, shipped.order_id, unshipped == 0)
            .await?;

        tx.commit().await?;
        tracing::info!(
            unit_id,
            order_id = shipped.order_id,
            unshipped,
            order_status = ?order_status,
            "unit shipped"
        );

        Ok(ShippedResult { unit_id, new_state, order_id: shipped.order_id, order_status })
    }

    // =========================================================================
    //  QUERIES
    // =========================================================================

    pub async fn get_queue(&self, query: &QueueQuery) -> Result<Vec<FulfillmentQueueRow>, AppError> {
        let page = PageParams { limit: query.limit, offset: query.offset }.resolve(self.page_limits);
        self.fulfillment_repo.queue(query.state, page).await
    }

    pub async fn get_order_summaries(
        &self,
        query: &OrderSummaryQuery,
    ) -> Result<Vec<OrderSummary>, AppError> {
        if let Some(order_id) = query.order_id {
            ensure_positive_id("orderId", order_id)?;
        }

        let filter = SummaryFilter {
            status: query.status,
            order_id: query.order_id,
            email_query: query
                .email
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        };
        let page = PageParams { limit: query.limit, offset: query.offset }.resolve(self.page_limits);

        self.fulfillment_repo.order_summaries(&filter, page).await
    }

    /// `Ok(None)` when the order does not exist.
    pub async fn get_order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>, AppError> {
        ensure_positive_id("orderId", order_id)?;

        let filter = SummaryFilter { order_id: Some(order_id), ..Default::default() };
        let page = PageParams { limit: Some(1), offset: Some(0) }.resolve(self.page_limits);
        let Some(order) = self.fulfillment_repo.order_summaries(&filter, page).await?.into_iter().next()
        else {
            return Ok(None);
        };

        let lines = self.order_repo.list_line_items(order_id).await?;
        let units = self.fulfillment_repo.units_for_order(order_id).await?;

        Ok(Some(OrderDetail { order, line_items: group_units(lines, units) }))
    }
}

/// The state guard of both transitions. Runs after the row lock, so a
/// concurrent loser sees the winner's state and fails here.
fn guard_transition(
    unit: &FulfillmentUnit,
    target: FulfillmentState,
) -> Result<FulfillmentState, AppError> {
    if !unit.state.can_transition_to(target) {
        tracing::warn!(unit_id = unit.id, from = %unit.state, to = %target, "rejected transition");
        return Err(AppError::InvalidTransition { unit_id: unit.id, from: unit.state, to: target });
    }
    Ok(target)
}

/// Attaches units to their line items, keeping both orderings from the queries.
fn group_units(
    lines: Vec<OrderLineItem>,
    units: Vec<FulfillmentUnitDetail>,
) -> Vec<OrderLineItemDetail> {
    let mut by_line: HashMap<i64, Vec<FulfillmentUnitDetail>> = HashMap::new();
    for unit in units {
        by_line.entry(unit.line_item_id).or_default().push(unit);
    }

    lines
        .into_iter()
        .map(|line| OrderLineItemDetail {
            line_item_id: line.id,
            item_id: line.item_id,
            title_snapshot: line.title_snapshot,
            unit_price_cents_snapshot: line.unit_price_cents_snapshot,
            quantity: line.quantity,
            units: by_line.remove(&line.id).unwrap_or_default(),
        })
        .collect()
}
