// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{CreateItemPayload, Item, ItemImage, UpdateItemPayload},
    models::orders::DEFAULT_CURRENCY,
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---

    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_item(&self, id: i64) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Images for the given items, ordered by `sort_order` (nulls last) then id.
    pub async fn list_images(&self, item_ids: &[i64]) -> Result<Vec<ItemImage>, AppError> {
        let images = sqlx::query_as::<_, ItemImage>(
            r#"
            SELECT * FROM item_images
            WHERE item_id = ANY($1)
            ORDER BY item_id ASC, sort_order ASC NULLS LAST, id ASC
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    // ---
    // Allocation (transactional)
    // ---

    /// Locks every requested item row, in ascending id order so concurrent
    /// multi-item orders always queue on the same sequence of locks.
    pub async fn lock_items_for_update<'e, E>(
        &self,
        executor: E,
        item_ids: &[i64],
    ) -> Result<Vec<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT * FROM items
            WHERE id = ANY($1)
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
        .bind(item_ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Conditional decrement; `false` means the row no longer had `quantity` in stock.
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        quantity: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET quantity_available = quantity_available - $2,
                updated_at = now()
            WHERE id = $1 AND quantity_available >= $2
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // ---
    // Admin maintenance
    // ---

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        input: &CreateItemPayload,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (title, description, price_cents, currency, quantity_available, make_time_minutes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(input.description.as_deref())
        .bind(input.price_cents)
        .bind(input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY))
        .bind(input.quantity_available)
        .bind(input.make_time_minutes)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// COALESCE keeps every column the patch leaves out; the nullable columns
    /// are switched on a presence flag so an explicit null clears them.
    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        id: i64,
        patch: &UpdateItemPayload,
    ) -> Result<Option<Item>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                title              = COALESCE($2, title),
                description        = CASE WHEN $9 THEN $3 ELSE description END,
                price_cents        = COALESCE($4, price_cents),
                currency           = COALESCE($5, currency),
                quantity_available = COALESCE($6, quantity_available),
                make_time_minutes  = CASE WHEN $10 THEN $7 ELSE make_time_minutes END,
                is_active          = COALESCE($8, is_active),
                updated_at         = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.description.clone().flatten())
        .bind(patch.price_cents)
        .bind(patch.currency.as_deref())
        .bind(patch.quantity_available)
        .bind(patch.make_time_minutes.flatten())
        .bind(patch.is_active)
        .bind(patch.description.is_some())
        .bind(patch.make_time_minutes.is_some())
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Returns `false` when no such item exists.
    pub async fn delete_item<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                // fulfillment_units.item_id is ON DELETE RESTRICT
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ItemInUse(id);
                    }
                }
                e.into()
            })?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn add_image<'e, E>(
        &self,
        executor: E,
        item_id: i64,
        url: &str,
        sort_order: Option<i32>,
        alt_text: Option<&str>,
    ) -> Result<ItemImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ItemImage>(
            r#"
            INSERT INTO item_images (item_id, url, sort_order, alt_text)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(url)
        .bind(sort_order)
        .bind(alt_text)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ItemNotFound(item_id);
                }
            }
            e.into()
        })
    }

    pub async fn delete_image<'e, E>(&self, executor: E, image_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM item_images WHERE id = $1")
            .bind(image_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
