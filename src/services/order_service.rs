// src/services/order_service.rs

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository},
    models::{
        fulfillment::FulfillmentState,
        orders::{
            AllocationCounts, CreateOrderPayload, CreateOrderResult, CreatedLineItem,
            TotalsResponse, DEFAULT_CURRENCY,
        },
    },
    services::allocation::{compute_totals, price_lines, StockLedger},
};

/// The fulfillment allocator: turns a validated order request into an order,
/// its line items and one fulfillment unit per unit of quantity.
#[derive(Clone)]
pub struct OrderService {
    catalog_repo: CatalogRepository,
    order_repo: OrderRepository,
    pool: PgPool,
}

impl OrderService {
    pub fn new(catalog_repo: CatalogRepository, order_repo: OrderRepository, pool: PgPool) -> Self {
        Self { catalog_repo, order_repo, pool }
    }

    /// All-or-nothing: any error drops the transaction, which rolls back.
    /// Payment capture must already have succeeded; nothing here knows about it.
    pub async fn create_order(&self, input: &CreateOrderPayload) -> Result<CreateOrderResult, AppError> {
        // Shape checks happen before a transaction is opened.
        input.validate()?;

        let currency = input.currency.clone().unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let tax_cents = input.tax_cents.unwrap_or(0);
        let shipping_cents = input.shipping_cents.unwrap_or(0);

        // Sorted + distinct: every order takes its item locks in the same order.
        let item_ids: Vec<i64> = input
            .items
            .iter()
            .map(|line| line.item_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut tx = self.pool.begin().await?;

        // 1. Lock and resolve the referenced items
        let items: HashMap<_, _> = self
            .catalog_repo
            .lock_items_for_update(&mut *tx, &item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        // 2. Snapshots and totals
        let priced = price_lines(&input.items, &items)?;
        let totals = compute_totals(&priced, tax_cents, shipping_cents)?;

        // 3. Order + line items, in request order
        let order = self
            .order_repo
            .insert_order(&mut *tx, &input.email, input.shipping_address.as_ref(), &currency, &totals)
            .await?;
        let order_id = order.id;

        let mut line_items = Vec::with_capacity(priced.len());
        for line in &priced {
            let row = self
                .order_repo
                .insert_line_item(
                    &mut *tx,
                    order_id,
                    line.item_id,
                    &line.title,
                    line.unit_price_cents,
                    line.quantity,
                )
                .await?;
            line_items.push(row);
        }

        // 4. Decide stock vs. production per line
        let mut ledger = StockLedger::new(items.values().map(|i| (i.id, i.quantity_available)));
        let mut allocations = Vec::with_capacity(line_items.len());
        let mut counts = AllocationCounts::default();
        for (line, priced_line) in line_items.iter().zip(&priced) {
            let item_id = priced_line.item_id;
            let alloc = ledger.allocate(item_id, line.quantity)?;
            counts.needs_shipped += i64::from(alloc.from_stock);
            counts.needs_created += i64::from(alloc.to_create);
            allocations.push((line.id, item_id, alloc));
        }

        // 5. Guarded stock decrement, one statement per item
        for (item_id, quantity) in ledger.decrements() {
            let applied = self.catalog_repo.decrement_stock(&mut *tx, item_id, quantity).await?;
            if !applied {
                tracing::error!(order_id, item_id, quantity, "stock decrement rejected under lock");
                return Err(AppError::InsufficientStock(item_id));
            }
        }

        // 6. Fulfillment units
        for (line_item_id, item_id, alloc) in &allocations {
            self.order_repo
                .insert_units(
                    &mut *tx,
                    order_id,
                    *line_item_id,
                    *item_id,
                    FulfillmentState::NeedsShipped,
                    alloc.from_stock,
                )
                .await?;
            self.order_repo
                .insert_units(
                    &mut *tx,
                    order_id,
                    *line_item_id,
                    *item_id,
                    FulfillmentState::NeedsCreated,
                    alloc.to_create,
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id,
            status = ?order.status,
            total_cents = totals.total_cents,
            needs_shipped = counts.needs_shipped,
            needs_created = counts.needs_created,
            "order created"
        );

        Ok(CreateOrderResult {
            order_id,
            totals: TotalsResponse { totals, currency },
            line_items: line_items.into_iter().map(CreatedLineItem::from).collect(),
            fulfillment: counts,
        })
    }
}
