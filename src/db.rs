pub mod user_repo;
pub use user_repo::UserRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod fulfillment_repo;
pub use fulfillment_repo::{FulfillmentRepository, SummaryFilter};
