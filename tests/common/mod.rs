#![allow(dead_code)]

use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use trove::domain::{Category, CreateItemRequest, Item, ItemCondition, ItemStatus, User};
use trove::repository::{
    ItemRepository, SqliteChatRepository, SqliteItemRepository, SqliteNotificationRepository,
    SqlitePayoutRepository, SqlitePurchaseRepository, SqliteUserRepository, UserRepository,
};
use trove::service::{ChatService, EscrowService};

pub async fn setup_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub async fn create_user(pool: &SqlitePool, email: &str, name: &str) -> anyhow::Result<User> {
    let repo = SqliteUserRepository::new(pool.clone());
    // Tests never log in, so an opaque hash placeholder is enough.
    Ok(repo.create(email, name, "unused-hash").await?)
}

pub async fn create_category(pool: &SqlitePool, name: &str) -> anyhow::Result<Category> {
    let repo = SqliteItemRepository::new(pool.clone());
    Ok(repo.create_category(name, &name.to_lowercase()).await?)
}

pub async fn create_approved_item(
    pool: &SqlitePool,
    seller_id: Uuid,
    category_id: Uuid,
    title: &str,
    price_minor: i64,
) -> anyhow::Result<Item> {
    let repo = SqliteItemRepository::new(pool.clone());
    let item = repo
        .create(
            seller_id,
            CreateItemRequest {
                title: title.to_string(),
                description: "A well-loved thing".to_string(),
                price_minor,
                original_price_minor: None,
                condition: ItemCondition::Good,
                category_id,
                images: vec![],
                tags: vec![],
            },
        )
        .await?;
    Ok(repo.set_status(item.id, ItemStatus::Approved).await?)
}

pub fn escrow_service(pool: &SqlitePool, auto_release_days: i64) -> EscrowService {
    EscrowService::new(
        Arc::new(SqlitePurchaseRepository::new(pool.clone())),
        Arc::new(SqliteItemRepository::new(pool.clone())),
        Arc::new(SqlitePayoutRepository::new(pool.clone())),
        Arc::new(SqliteNotificationRepository::new(pool.clone())),
        auto_release_days,
    )
}

pub fn chat_service(pool: &SqlitePool) -> ChatService {
    ChatService::new(
        Arc::new(SqliteChatRepository::new(pool.clone())),
        Arc::new(SqliteItemRepository::new(pool.clone())),
    )
}
