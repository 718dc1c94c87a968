// src/handlers/orders.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::{Validate, ValidationErrors};

use axum_extra::extract::WithRejection;

use crate::{
    common::{error::AppError, validation::field_error},
    config::{AppState, OrderLimits},
    models::orders::{CreateOrderPayload, CreateOrderResult},
};

/// Per-line and per-order unit ceilings for public checkout.
pub fn check_order_limits(
    payload: &CreateOrderPayload,
    limits: &OrderLimits,
) -> Result<(), ValidationErrors> {
    if let Some(line) = payload
        .items
        .iter()
        .find(|line| line.quantity > limits.max_quantity_per_item)
    {
        return Err(field_error(
            "items",
            "max_quantity_per_item",
            format!(
                "Quantity for item {} exceeds the limit of {}.",
                line.item_id, limits.max_quantity_per_item
            ),
        ));
    }

    if payload.total_quantity() > limits.max_total_items {
        return Err(field_error(
            "items",
            "max_total_items",
            format!("An order can contain at most {} units.", limits.max_total_items),
        ));
    }

    Ok(())
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Order allocated", body = CreateOrderResult),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown or inactive item"),
        (status = 409, description = "Stock changed underneath the allocation")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateOrderPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    check_order_limits(&payload, &app_state.settings.order_limits)?;

    let result = app_state.order_service.create_order(&payload).await?;

    Ok((StatusCode::CREATED, Json(result)))
}
