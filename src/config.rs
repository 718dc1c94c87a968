// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::{
    common::pagination::PageLimits,
    db::{CatalogRepository, FulfillmentRepository, OrderRepository, UserRepository},
    services::{AuthService, CatalogService, FulfillmentService, OrderService},
};

/// Ceilings applied to public orders before they reach the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLimits {
    pub max_quantity_per_item: i32,
    pub max_total_items: i64,
}

impl Default for OrderLimits {
    fn default() -> Self {
        Self { max_quantity_per_item: 10, max_total_items: 20 }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_statement_timeout: Duration,
    pub order_limits: OrderLimits,
    pub page_limits: PageLimits,
    pub cors_origins: Vec<String>,
    /// `(email, password)` of the admin account seeded at start-up.
    pub admin_bootstrap: Option<(String, String)>,
}

impl Settings {
    /// Defaults for everything except the two secrets.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            bind_addr: "0.0.0.0:4001".to_string(),
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(3),
            db_statement_timeout: Duration::from_secs(10),
            order_limits: OrderLimits::default(),
            page_limits: PageLimits::default(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            admin_bootstrap: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let mut settings = Self::new(database_url, jwt_secret);

        if let Ok(addr) = env::var("BIND_ADDR") {
            settings.bind_addr = addr;
        }
        if let Some(n) = env_parse("DB_MAX_CONNECTIONS")? {
            settings.db_max_connections = n;
        }
        if let Some(secs) = env_parse("DB_ACQUIRE_TIMEOUT_SECS")? {
            settings.db_acquire_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse("DB_STATEMENT_TIMEOUT_SECS")? {
            settings.db_statement_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_parse("MAX_QUANTITY_PER_ITEM")? {
            settings.order_limits.max_quantity_per_item = n;
        }
        if let Some(n) = env_parse("MAX_TOTAL_ORDER_ITEMS")? {
            settings.order_limits.max_total_items = n;
        }
        if let Some(n) = env_parse("QUEUE_PAGE_SIZE_DEFAULT")? {
            settings.page_limits.default_size = n;
        }
        if let Some(n) = env_parse("QUEUE_PAGE_SIZE_MAX")? {
            settings.page_limits.max_size = n;
        }
        if let Ok(origins) = env::var("CORS_ORIGINS") {
            settings.cors_origins = split_origins(&origins);
        }
        if let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            settings.admin_bootstrap = Some((email, password));
        }

        Ok(settings)
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub fulfillment_service: FulfillmentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;

        let connect_options = PgConnectOptions::from_str(&settings.database_url)
            .context("DATABASE_URL is not a valid PostgreSQL URL")?
            .options([(
                "statement_timeout",
                settings.db_statement_timeout.as_millis().to_string(),
            )]);

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(settings.db_acquire_timeout)
            .connect_with(connect_options)
            .await
            .context("failed to connect to the database")?;

        tracing::info!(max_connections = settings.db_max_connections, "database pool ready");

        Ok(Self::from_pool(db_pool, settings))
    }

    /// Wires repositories and services over an existing pool.
    pub fn from_pool(db_pool: PgPool, settings: Settings) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let fulfillment_repo = FulfillmentRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, settings.jwt_secret.clone(), db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), db_pool.clone());
        let order_service = OrderService::new(catalog_repo, order_repo.clone(), db_pool.clone());
        let fulfillment_service = FulfillmentService::new(
            fulfillment_repo,
            order_repo,
            db_pool.clone(),
            settings.page_limits,
        );

        Self {
            db_pool,
            settings: Arc::new(settings),
            auth_service,
            catalog_service,
            order_service,
            fulfillment_service,
        }
    }
}
