// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::common::validation::field_error;

// --- Items ---
// `quantity_available` counts finished goods on the shelf; the allocator is
// the only writer besides admin edits.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    #[schema(example = "Crochet bumblebee")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = 1800)]
    pub price_cents: i64,
    #[schema(example = "USD")]
    pub currency: String,
    pub quantity_available: i32,
    /// Estimated production time for a unit that has to be made.
    pub make_time_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    pub id: i64,
    pub item_id: i64,
    pub url: String,
    pub sort_order: Option<i32>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemWithImages {
    #[serde(flatten)]
    pub item: Item,
    pub images: Vec<ItemImage>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "title is required."))]
    pub title: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "priceCents must be >= 0."))]
    pub price_cents: i64,

    #[validate(length(equal = 3, message = "currency must be a 3-letter code."))]
    pub currency: Option<String>,

    #[validate(range(min = 0, message = "quantityAvailable must be >= 0."))]
    #[serde(default)]
    pub quantity_available: i32,

    #[validate(range(min = 0, message = "makeTimeMinutes must be >= 0."))]
    pub make_time_minutes: Option<i32>,

    pub is_active: Option<bool>,
}

/// Partial update: absent fields keep their stored value. The nullable
/// columns (`description`, `makeTimeMinutes`) are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 1, message = "title must be a non-empty string."))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[validate(range(min = 0, message = "priceCents must be >= 0."))]
    pub price_cents: Option<i64>,

    #[validate(length(equal = 3, message = "currency must be a 3-letter code."))]
    pub currency: Option<String>,

    #[validate(range(min = 0, message = "quantityAvailable must be >= 0."))]
    pub quantity_available: Option<i32>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub make_time_minutes: Option<Option<i32>>,

    pub is_active: Option<bool>,
}

impl UpdateItemPayload {
    /// Rules on the clearable fields, which the derive does not look into.
    pub fn validate_clearable(&self) -> Result<(), ValidationErrors> {
        if matches!(self.make_time_minutes, Some(Some(minutes)) if minutes < 0) {
            return Err(field_error("makeTimeMinutes", "range", "makeTimeMinutes must be >= 0."));
        }
        Ok(())
    }
}

// A field that is present maps to `Some`, even when its value is `null`;
// `#[serde(default)]` covers the absent case.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddImagePayload {
    #[validate(length(min = 1, message = "url is required."))]
    pub url: String,
    pub sort_order: Option<i32>,
    pub alt_text: Option<String>,
}
