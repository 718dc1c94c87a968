// src/router.rs

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{admin_guard, auth_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new().route("/login", post(handlers::auth::login)).route(
        "/me",
        get(handlers::auth::get_me).route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        )),
    );

    let order_routes = Router::new().route("/", post(handlers::orders::create_order));

    // Staff
    let fulfillment_routes = Router::new()
        .route("/queue", get(handlers::fulfillment::get_queue))
        .route("/orders", get(handlers::fulfillment::get_order_summaries))
        .route("/orders/{id}", get(handlers::fulfillment::get_order_detail))
        .route("/units/{id}/created-done", patch(handlers::fulfillment::mark_created_done))
        .route("/units/{id}/ship", patch(handlers::fulfillment::mark_shipped));

    let catalog_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_items).post(handlers::catalog::create_item),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_item)
                .patch(handlers::catalog::update_item)
                .delete(handlers::catalog::delete_item),
        )
        .route("/{id}/images", post(handlers::catalog::add_image))
        .route("/images/{image_id}", delete(handlers::catalog::delete_image));

    let admin_routes = Router::new()
        .nest("/fulfillment", fulfillment_routes)
        .nest("/items", catalog_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), admin_guard));

    let cors = cors_layer(&app_state.settings.cors_origins);

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
