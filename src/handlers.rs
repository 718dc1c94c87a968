pub mod auth;
pub mod catalog;
pub mod fulfillment;
pub mod health;
pub mod orders;
