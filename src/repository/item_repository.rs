use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Category, CreateItemRequest, Item, ItemCondition, ItemFilter, ItemStatus},
    error::{AppError, Result},
    repository::ItemRepository,
};

#[derive(FromRow)]
struct ItemRow {
    id: String,
    title: String,
    description: String,
    price_minor: i64,
    original_price_minor: Option<i64>,
    condition: String,
    status: String,
    category_id: String,
    seller_id: String,
    images: String,
    tags: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    slug: String,
}

const ITEM_COLUMNS: &str = "id, title, description, price_minor, original_price_minor, condition, \
     status, category_id, seller_id, images, tags, created_at, updated_at";

pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_item(row: ItemRow) -> Result<Item> {
        Ok(Item {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            price_minor: row.price_minor,
            original_price_minor: row.original_price_minor,
            condition: Self::parse_condition(&row.condition)?,
            status: Self::parse_status(&row.status)?,
            category_id: Uuid::parse_str(&row.category_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            seller_id: Uuid::parse_str(&row.seller_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            images: serde_json::from_str(&row.images)
                .map_err(|e| AppError::Database(e.to_string()))?,
            tags: serde_json::from_str(&row.tags)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_category(row: CategoryRow) -> Result<Category> {
        Ok(Category {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            slug: row.slug,
        })
    }

    fn parse_status(s: &str) -> Result<ItemStatus> {
        match s {
            "PENDING" => Ok(ItemStatus::Pending),
            "APPROVED" => Ok(ItemStatus::Approved),
            "REJECTED" => Ok(ItemStatus::Rejected),
            "SOLD" => Ok(ItemStatus::Sold),
            _ => Err(AppError::Database(format!("Invalid item status: {}", s))),
        }
    }

    fn status_to_str(status: ItemStatus) -> &'static str {
        match status {
            ItemStatus::Pending => "PENDING",
            ItemStatus::Approved => "APPROVED",
            ItemStatus::Rejected => "REJECTED",
            ItemStatus::Sold => "SOLD",
        }
    }

    fn parse_condition(s: &str) -> Result<ItemCondition> {
        match s {
            "NEW" => Ok(ItemCondition::New),
            "LIKE_NEW" => Ok(ItemCondition::LikeNew),
            "GOOD" => Ok(ItemCondition::Good),
            "FAIR" => Ok(ItemCondition::Fair),
            _ => Err(AppError::Database(format!("Invalid item condition: {}", s))),
        }
    }

    fn condition_to_str(condition: ItemCondition) -> &'static str {
        match condition {
            ItemCondition::New => "NEW",
            ItemCondition::LikeNew => "LIKE_NEW",
            ItemCondition::Good => "GOOD",
            ItemCondition::Fair => "FAIR",
        }
    }
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    async fn create(&self, seller_id: Uuid, request: CreateItemRequest) -> Result<Item> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let images = serde_json::to_string(&request.images)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let tags = serde_json::to_string(&request.tags)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO items (
                id, title, description, price_minor, original_price_minor,
                condition, status, category_id, seller_id, images, tags,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, 'PENDING', ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price_minor)
        .bind(request.original_price_minor)
        .bind(Self::condition_to_str(request.condition))
        .bind(request.category_id.to_string())
        .bind(seller_id.to_string())
        .bind(&images)
        .bind(&tags)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created item".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM items WHERE id = ?",
            ITEM_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_item(r)?)),
            None => Ok(None),
        }
    }

    async fn list_approved(&self, filter: &ItemFilter) -> Result<Vec<Item>> {
        let mut sql = format!(
            "SELECT {} FROM items WHERE status = 'APPROVED'",
            ITEM_COLUMNS
        );
        if filter.category_id.is_some() {
            sql.push_str(" AND category_id = ?");
        }
        if filter.query.is_some() {
            sql.push_str(" AND (title LIKE ? OR description LIKE ?)");
        }
        if filter.min_price.is_some() {
            sql.push_str(" AND price_minor >= ?");
        }
        if filter.max_price.is_some() {
            sql.push_str(" AND price_minor <= ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, ItemRow>(&sql);
        if let Some(category_id) = filter.category_id {
            query = query.bind(category_id.to_string());
        }
        if let Some(ref text) = filter.query {
            let pattern = format!("%{}%", text);
            query = query.bind(pattern.clone()).bind(pattern);
        }
        if let Some(min_price) = filter.min_price {
            query = query.bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            query = query.bind(max_price);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn list_by_status(&self, status: ItemStatus) -> Result<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM items WHERE status = ? ORDER BY created_at DESC",
            ITEM_COLUMNS
        ))
        .bind(Self::status_to_str(status))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn set_status(&self, id: Uuid, status: ItemStatus) -> Result<Item> {
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE items SET status = ?, updated_at = ? WHERE id = ?")
            .bind(Self::status_to_str(status))
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    async fn create_category(&self, name: &str, slug: &str) -> Result<Category> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO categories (id, name, slug) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_category).collect()
    }
}
