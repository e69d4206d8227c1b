use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_minor: i64,
    pub original_price_minor: Option<i64>,
    pub condition: ItemCondition,
    pub status: ItemStatus,
    pub category_id: Uuid,
    pub seller_id: Uuid,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Approved,
    Rejected,
    Sold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    New,
    LikeNew,
    Good,
    Fair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub price_minor: i64,
    pub original_price_minor: Option<i64>,
    pub condition: ItemCondition,
    pub category_id: Uuid,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Browse filters for the public listing page. All optional; text
/// search matches title or description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
    pub category_id: Option<Uuid>,
    pub query: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}
