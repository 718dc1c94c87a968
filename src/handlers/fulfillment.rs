// src/handlers/fulfillment.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use axum_extra::extract::WithRejection;

use crate::{
    common::error::AppError,
    config::AppState,
    models::fulfillment::{
        CreatedDoneResult, OrderDetail, OrderSummary, OrderSummaryQuery, QueueQuery,
        QueueResponse, ShippedResult,
    },
};

// =============================================================================
//  1. TRANSITIONS
// =============================================================================

// PATCH /api/admin/fulfillment/units/{id}/created-done
#[utoipa::path(
    patch,
    path = "/api/admin/fulfillment/units/{id}/created-done",
    tag = "Fulfillment",
    params(("id" = i64, Path, description = "Fulfillment unit id")),
    responses(
        (status = 200, description = "Unit moved to NEEDS_SHIPPED", body = CreatedDoneResult),
        (status = 404, description = "Unknown unit"),
        (status = 409, description = "Unit is not in NEEDS_CREATED")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_created_done(
    State(app_state): State<AppState>,
    WithRejection(Path(unit_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<CreatedDoneResult>, AppError> {
    let result = app_state.fulfillment_service.mark_created_done(unit_id).await?;
    Ok(Json(result))
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipPayload {
    #[validate(length(min = 1, max = 100, message = "carrier must be 1-100 characters."))]
    #[schema(example = "USPS")]
    pub carrier: Option<String>,

    #[validate(length(min = 1, max = 100, message = "trackingNumber must be 1-100 characters."))]
    #[schema(example = "9400111899223856012345")]
    pub tracking_number: Option<String>,
}

// PATCH /api/admin/fulfillment/units/{id}/ship
#[utoipa::path(
    patch,
    path = "/api/admin/fulfillment/units/{id}/ship",
    tag = "Fulfillment",
    params(("id" = i64, Path, description = "Fulfillment unit id")),
    request_body(content = ShipPayload, description = "Optional carrier details"),
    responses(
        (status = 200, description = "Unit shipped; order status recomputed", body = ShippedResult),
        (status = 404, description = "Unknown unit"),
        (status = 409, description = "Unit is not in NEEDS_SHIPPED")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_shipped(
    State(app_state): State<AppState>,
    WithRejection(Path(unit_id), _): WithRejection<Path<i64>, AppError>,
    body: Bytes,
) -> Result<Json<ShippedResult>, AppError> {
    // The body is optional; an empty one ships without carrier details.
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        ShipPayload::default()
    } else {
        serde_json::from_slice::<ShipPayload>(&body)
            .map_err(|e| AppError::MalformedRequest(e.to_string()))?
    };
    payload.validate()?;

    let result = app_state
        .fulfillment_service
        .mark_shipped(unit_id, payload.carrier.as_deref(), payload.tracking_number.as_deref())
        .await?;

    Ok(Json(result))
}

// =============================================================================
//  2. STAFF VIEWS
// =============================================================================

// GET /api/admin/fulfillment/queue
#[utoipa::path(
    get,
    path = "/api/admin/fulfillment/queue",
    tag = "Fulfillment",
    params(QueueQuery),
    responses(
        (status = 200, description = "Units in the requested state, oldest first", body = QueueResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_queue(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<QueueQuery>, AppError>,
) -> Result<Json<QueueResponse>, AppError> {
    let rows = app_state.fulfillment_service.get_queue(&query).await?;

    Ok(Json(QueueResponse { state: query.state, count: rows.len(), rows }))
}

// GET /api/admin/fulfillment/orders
#[utoipa::path(
    get,
    path = "/api/admin/fulfillment/orders",
    tag = "Fulfillment",
    params(OrderSummaryQuery),
    responses(
        (status = 200, description = "Orders with unit counts, newest first", body = [OrderSummary])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order_summaries(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<OrderSummaryQuery>, AppError>,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    let rows = app_state.fulfillment_service.get_order_summaries(&query).await?;
    Ok(Json(rows))
}

// GET /api/admin/fulfillment/orders/{id}
#[utoipa::path(
    get,
    path = "/api/admin/fulfillment/orders/{id}",
    tag = "Fulfillment",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with line items and their units", body = OrderDetail),
        (status = 404, description = "Unknown order")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order_detail(
    State(app_state): State<AppState>,
    WithRejection(Path(order_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<OrderDetail>, AppError> {
    app_state
        .fulfillment_service
        .get_order_detail(order_id)
        .await?
        .map(Json)
        .ok_or(AppError::OrderNotFound(order_id))
}
