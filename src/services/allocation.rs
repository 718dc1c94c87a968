// src/services/allocation.rs
//
// Pure part of order creation: price snapshots, totals and the per-line
// stock-vs-production split. The order service feeds it the locked item rows
// and persists whatever it decides.

use std::collections::{BTreeMap, HashMap};

use crate::{
    common::{error::AppError, validation::field_error},
    models::{
        catalog::Item,
        orders::{OrderLinePayload, OrderTotals},
    },
};

/// A requested line with title and unit price copied from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: i64,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

/// How one line's quantity splits between shelf stock and production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAllocation {
    pub from_stock: i32,
    pub to_create: i32,
}

/// Resolves every requested line against the locked items, in request order.
/// A missing id wins over an inactive one, line by line.
pub fn price_lines(
    lines: &[OrderLinePayload],
    items: &HashMap<i64, Item>,
) -> Result<Vec<PricedLine>, AppError> {
    for line in lines {
        let item = items.get(&line.item_id).ok_or(AppError::ItemNotFound(line.item_id))?;
        if !item.is_active {
            return Err(AppError::ItemInactive(line.item_id));
        }
    }

    Ok(lines
        .iter()
        .filter_map(|line| {
            items.get(&line.item_id).map(|item| PricedLine {
                item_id: item.id,
                title: item.title.clone(),
                unit_price_cents: item.price_cents,
                quantity: line.quantity,
            })
        })
        .collect())
}

/// `total = subtotal + tax + shipping`, with overflow reported as bad input.
pub fn compute_totals(
    lines: &[PricedLine],
    tax_cents: i64,
    shipping_cents: i64,
) -> Result<OrderTotals, AppError> {
    let overflow = || {
        AppError::ValidationError(field_error(
            "items",
            "overflow",
            "Order total is too large.",
        ))
    };

    let subtotal_cents = lines.iter().try_fold(0i64, |acc, line| {
        line.unit_price_cents
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| acc.checked_add(line_total))
    });
    let subtotal_cents = subtotal_cents.ok_or_else(overflow)?;

    let total_cents = subtotal_cents
        .checked_add(tax_cents)
        .and_then(|t| t.checked_add(shipping_cents))
        .ok_or_else(overflow)?;

    Ok(OrderTotals { subtotal_cents, tax_cents, shipping_cents, total_cents })
}

/// In-memory view of the locked stock for one order. Later lines for the same
/// item only see what earlier lines left behind.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    remaining: HashMap<i64, i32>,
    decrements: BTreeMap<i64, i32>,
}

impl StockLedger {
    pub fn new(stock: impl IntoIterator<Item = (i64, i32)>) -> Self {
        Self {
            remaining: stock.into_iter().map(|(id, qty)| (id, qty.max(0))).collect(),
            decrements: BTreeMap::new(),
        }
    }

    pub fn allocate(&mut self, item_id: i64, quantity: i32) -> Result<LineAllocation, AppError> {
        let remaining = self
            .remaining
            .get_mut(&item_id)
            .ok_or(AppError::ItemNotFound(item_id))?;

        let from_stock = quantity.min(*remaining).max(0);
        *remaining -= from_stock;
        if from_stock > 0 {
            *self.decrements.entry(item_id).or_insert(0) += from_stock;
        }

        Ok(LineAllocation { from_stock, to_create: quantity - from_stock })
    }

    /// Aggregated decrement per item, ascending item id. Items with nothing
    /// taken from stock are absent.
    pub fn decrements(&self) -> impl Iterator<Item = (i64, i32)> + '_ {
        self.decrements.iter().map(|(id, qty)| (*id, *qty))
    }
}
