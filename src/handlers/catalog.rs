// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use axum_extra::extract::WithRejection;

use crate::{
    common::error::AppError,
    config::AppState,
    models::catalog::{
        AddImagePayload, CreateItemPayload, Item, ItemImage, ItemWithImages, UpdateItemPayload,
    },
};

// GET /api/admin/items
#[utoipa::path(
    get,
    path = "/api/admin/items",
    tag = "Catalog",
    responses((status = 200, description = "All items, by id", body = [Item])),
    security(("api_jwt" = []))
)]
pub async fn list_items(State(app_state): State<AppState>) -> Result<Json<Vec<Item>>, AppError> {
    let items = app_state.catalog_service.list_items().await?;
    Ok(Json(items))
}

// GET /api/admin/items/{id}
#[utoipa::path(
    get,
    path = "/api/admin/items/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item with its images", body = ItemWithImages),
        (status = 404, description = "Unknown item")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<ItemWithImages>, AppError> {
    let item = app_state.catalog_service.get_item(item_id).await?;
    Ok(Json(item))
}

// POST /api/admin/items
#[utoipa::path(
    post,
    path = "/api/admin/items",
    tag = "Catalog",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid item")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateItemPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.catalog_service.create_item(&payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PATCH /api/admin/items/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/items/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Item id")),
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Unknown item")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateItemPayload>, AppError>,
) -> Result<Json<Item>, AppError> {
    let item = app_state.catalog_service.update_item(item_id, &payload).await?;
    Ok(Json(item))
}

// DELETE /api/admin/items/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/items/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Unknown item"),
        (status = 409, description = "Fulfillment units still reference the item")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/items/{id}/images
#[utoipa::path(
    post,
    path = "/api/admin/items/{id}/images",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Item id")),
    request_body = AddImagePayload,
    responses(
        (status = 201, description = "Image attached", body = ItemImage),
        (status = 404, description = "Unknown item")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_image(
    State(app_state): State<AppState>,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<AddImagePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let image = app_state.catalog_service.add_image(item_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

// DELETE /api/admin/items/images/{image_id}
#[utoipa::path(
    delete,
    path = "/api/admin/items/images/{image_id}",
    tag = "Catalog",
    params(("image_id" = i64, Path, description = "Image id")),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Unknown image")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_image(
    State(app_state): State<AppState>,
    WithRejection(Path(image_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_image(image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
