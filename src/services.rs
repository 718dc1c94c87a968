pub mod allocation;
pub mod auth;
pub mod catalog_service;
pub mod fulfillment_service;
pub mod order_service;

pub use auth::AuthService;
pub use catalog_service::CatalogService;
pub use fulfillment_service::FulfillmentService;
pub use order_service::OrderService;
