// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Orders ---
        handlers::orders::create_order,

        // --- Fulfillment ---
        handlers::fulfillment::mark_created_done,
        handlers::fulfillment::mark_shipped,
        handlers::fulfillment::get_queue,
        handlers::fulfillment::get_order_summaries,
        handlers::fulfillment::get_order_detail,

        // --- Catalog ---
        handlers::catalog::list_items,
        handlers::catalog::get_item,
        handlers::catalog::create_item,
        handlers::catalog::update_item,
        handlers::catalog::delete_item,
        handlers::catalog::add_image,
        handlers::catalog::delete_image,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,

            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::OrderLinePayload,
            models::orders::CreateOrderPayload,
            models::orders::OrderTotals,
            models::orders::TotalsResponse,
            models::orders::AllocationCounts,
            models::orders::CreatedLineItem,
            models::orders::CreateOrderResult,

            // --- Fulfillment ---
            models::fulfillment::FulfillmentState,
            models::fulfillment::FulfillmentQueueRow,
            models::fulfillment::QueueResponse,
            models::fulfillment::OrderSummary,
            models::fulfillment::FulfillmentUnitDetail,
            models::fulfillment::OrderLineItemDetail,
            models::fulfillment::OrderDetail,
            models::fulfillment::CreatedDoneResult,
            models::fulfillment::ShippedResult,
            handlers::fulfillment::ShipPayload,

            // --- Catalog ---
            models::catalog::Item,
            models::catalog::ItemImage,
            models::catalog::ItemWithImages,
            models::catalog::CreateItemPayload,
            models::catalog::UpdateItemPayload,
            models::catalog::AddImagePayload,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Auth", description = "Staff sign-in"),
        (name = "Orders", description = "Checkout and allocation"),
        (name = "Fulfillment", description = "Production and shipping queues"),
        (name = "Catalog", description = "Item and image maintenance")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
