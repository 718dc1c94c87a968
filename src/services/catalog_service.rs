// src/services/catalog_service.rs

use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::ensure_positive_id},
    db::CatalogRepository,
    models::catalog::{
        AddImagePayload, CreateItemPayload, Item, ItemImage, ItemWithImages, UpdateItemPayload,
    },
};

/// Admin maintenance of the catalog. Edits never reach line-item snapshots.
#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, pool: PgPool) -> Self {
        Self { catalog_repo, pool }
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        self.catalog_repo.list_items().await
    }

    pub async fn get_item(&self, item_id: i64) -> Result<ItemWithImages, AppError> {
        ensure_positive_id("itemId", item_id)?;

        let item = self
            .catalog_repo
            .find_item(item_id)
            .await?
            .ok_or(AppError::ItemNotFound(item_id))?;
        let images = self.catalog_repo.list_images(&[item_id]).await?;

        Ok(ItemWithImages { item, images })
    }

    pub async fn create_item(&self, input: &CreateItemPayload) -> Result<Item, AppError> {
        input.validate()?;

        let item = self.catalog_repo.create_item(&self.pool, input).await?;
        tracing::info!(item_id = item.id, stock = item.quantity_available, "item created");
        Ok(item)
    }

    pub async fn update_item(&self, item_id: i64, patch: &UpdateItemPayload) -> Result<Item, AppError> {
        ensure_positive_id("itemId", item_id)?;
        patch.validate()?;
        patch.validate_clearable()?;

        let item = self
            .catalog_repo
            .update_item(&self.pool, item_id, patch)
            .await?
            .ok_or(AppError::ItemNotFound(item_id))?;
        tracing::info!(item_id, "item updated");
        Ok(item)
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<(), AppError> {
        ensure_positive_id("itemId", item_id)?;

        if !self.catalog_repo.delete_item(&self.pool, item_id).await? {
            return Err(AppError::ItemNotFound(item_id));
        }
        tracing::info!(item_id, "item deleted");
        Ok(())
    }

    pub async fn add_image(&self, item_id: i64, input: &AddImagePayload) -> Result<ItemImage, AppError> {
        ensure_positive_id("itemId", item_id)?;
        input.validate()?;

        self.catalog_repo
            .add_image(&self.pool, item_id, &input.url, input.sort_order, input.alt_text.as_deref())
            .await
    }

    pub async fn delete_image(&self, image_id: i64) -> Result<(), AppError> {
        ensure_positive_id("imageId", image_id)?;

        if !self.catalog_repo.delete_image(&self.pool, image_id).await? {
            return Err(AppError::ImageNotFound(image_id));
        }
        Ok(())
    }
}
