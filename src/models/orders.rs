// src/models/orders.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_CURRENCY: &str = "USD";

// --- Enums ---

/// Derived from the order's units; never set by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    Complete,
}

// --- Rows ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    pub email: String,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<serde_json::Value>,
    pub currency: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub estimated_ready_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title and price are frozen at order time; `item_id` goes null if the item is deleted.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub item_id: Option<i64>,
    pub title_snapshot: String,
    pub unit_price_cents_snapshot: i64,
    pub quantity: i32,
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    #[validate(range(min = 1, message = "itemId must be a positive integer."))]
    #[schema(example = 1)]
    pub item_id: i64,

    #[validate(range(min = 1, message = "quantity must be at least 1."))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[validate(email(message = "A valid e-mail is required."))]
    #[schema(example = "buyer@example.com")]
    pub email: String,

    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<serde_json::Value>,

    #[validate(length(min = 1, message = "items must be a non-empty array."), nested)]
    pub items: Vec<OrderLinePayload>,

    #[validate(range(min = 0, message = "taxCents cannot be negative."))]
    pub tax_cents: Option<i64>,

    #[validate(range(min = 0, message = "shippingCents cannot be negative."))]
    pub shipping_cents: Option<i64>,

    #[validate(length(equal = 3, message = "currency must be a 3-letter code."))]
    #[schema(example = "USD")]
    pub currency: Option<String>,
}

impl CreateOrderPayload {
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| i64::from(line.quantity)).sum()
    }
}

// --- Results ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCounts {
    pub needs_created: i64,
    pub needs_shipped: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLineItem {
    pub id: i64,
    pub item_id: Option<i64>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub title: String,
}

impl From<OrderLineItem> for CreatedLineItem {
    fn from(row: OrderLineItem) -> Self {
        Self {
            id: row.id,
            item_id: row.item_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents_snapshot,
            title: row.title_snapshot,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResult {
    pub order_id: i64,
    pub totals: TotalsResponse,
    pub line_items: Vec<CreatedLineItem>,
    pub fulfillment: AllocationCounts,
}
