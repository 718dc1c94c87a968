// src/models/fulfillment.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::orders::OrderStatus;

// --- Enums ---

/// Lifecycle of one physical unit: produced (if needed), then shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fulfillment_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentState {
    NeedsCreated,
    NeedsShipped,
    Shipped,
}

impl FulfillmentState {
    pub fn as_str(self) -> &'static str {
        match self {
            FulfillmentState::NeedsCreated => "NEEDS_CREATED",
            FulfillmentState::NeedsShipped => "NEEDS_SHIPPED",
            FulfillmentState::Shipped => "SHIPPED",
        }
    }

    /// The only state reachable from `self`, if any.
    pub fn successor(self) -> Option<FulfillmentState> {
        match self {
            FulfillmentState::NeedsCreated => Some(FulfillmentState::NeedsShipped),
            FulfillmentState::NeedsShipped => Some(FulfillmentState::Shipped),
            FulfillmentState::Shipped => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    /// Linear progression only: no skipping, no reverse, nothing out of SHIPPED.
    pub fn can_transition_to(self, target: FulfillmentState) -> bool {
        self.successor() == Some(target)
    }
}

impl fmt::Display for FulfillmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Rows ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentUnit {
    pub id: i64,
    pub order_id: i64,
    pub order_line_item_id: i64,
    pub item_id: i64,
    pub state: FulfillmentState,
    pub queued_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
}

/// One row of a staff FIFO queue.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentQueueRow {
    pub unit_id: i64,
    pub state: FulfillmentState,
    pub queued_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,

    pub item_id: i64,
    pub item_title: String,

    pub order_id: i64,
    pub order_email: String,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<serde_json::Value>,

    pub line_item_id: i64,
    pub line_item_title_snapshot: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: i64,
    pub order_status: OrderStatus,
    pub order_email: String,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<serde_json::Value>,
    pub currency: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_units: i64,
    pub needs_created_units: i64,
    pub needs_shipped_units: i64,
    pub shipped_units: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentUnitDetail {
    pub unit_id: i64,
    pub state: FulfillmentState,
    pub queued_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub item_id: i64,
    pub item_title: String,
    pub line_item_id: i64,
    pub line_item_title_snapshot: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemDetail {
    pub line_item_id: i64,
    pub item_id: Option<i64>,
    pub title_snapshot: String,
    pub unit_price_cents_snapshot: i64,
    pub quantity: i32,
    pub units: Vec<FulfillmentUnitDetail>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: OrderSummary,
    pub line_items: Vec<OrderLineItemDetail>,
}

// --- Filters ---

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QueueQuery {
    pub state: FulfillmentState,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderSummaryQuery {
    pub status: Option<OrderStatus>,
    pub order_id: Option<i64>,
    /// Case-insensitive substring of the customer e-mail.
    pub email: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// --- Transition results ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDoneResult {
    pub unit_id: i64,
    pub new_state: FulfillmentState,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippedResult {
    pub unit_id: i64,
    pub new_state: FulfillmentState,
    pub order_id: i64,
    pub order_status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub state: FulfillmentState,
    pub count: usize,
    pub rows: Vec<FulfillmentQueueRow>,
}
