mod common;

use std::sync::Arc;

use sqlx::SqlitePool;
use trove::domain::{CreateItemRequest, ItemCondition, ItemFilter, ItemStatus};
use trove::error::AppError;
use trove::repository::{SqliteItemRepository, SqliteNotificationRepository};
use trove::service::ItemService;
use uuid::Uuid;

fn item_service(pool: &SqlitePool) -> ItemService {
    ItemService::new(
        Arc::new(SqliteItemRepository::new(pool.clone())),
        Arc::new(SqliteNotificationRepository::new(pool.clone())),
    )
}

fn listing(category_id: Uuid, title: &str, price_minor: i64) -> CreateItemRequest {
    CreateItemRequest {
        title: title.to_string(),
        description: "Lightly used".to_string(),
        price_minor,
        original_price_minor: Some(price_minor * 2),
        condition: ItemCondition::LikeNew,
        category_id,
        images: vec!["https://img.example/1.jpg".to_string()],
        tags: vec!["vintage".to_string()],
    }
}

#[tokio::test]
async fn test_moderation_lifecycle() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let category = common::create_category(&pool, "Cameras").await?;
    let service = item_service(&pool);

    let item = service
        .submit_item(seller.id, listing(category.id, "Film camera", 45_000))
        .await?;
    assert_eq!(item.status, ItemStatus::Pending);

    // Pending items are invisible to browsing
    let visible = service.browse(&ItemFilter::default()).await?;
    assert!(visible.is_empty());
    let pending = service.list_pending().await?;
    assert_eq!(pending.len(), 1);

    let item = service.approve(item.id).await?;
    assert_eq!(item.status, ItemStatus::Approved);
    let visible = service.browse(&ItemFilter::default()).await?;
    assert_eq!(visible.len(), 1);

    // Moderating twice is a conflict
    let err = service.approve(item.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let err = service.reject(item.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn test_rejected_items_stay_hidden() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let category = common::create_category(&pool, "Phones").await?;
    let service = item_service(&pool);

    let item = service
        .submit_item(seller.id, listing(category.id, "Cracked phone", 10_000))
        .await?;
    let item = service.reject(item.id).await?;
    assert_eq!(item.status, ItemStatus::Rejected);

    let visible = service.browse(&ItemFilter::default()).await?;
    assert!(visible.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_browse_filters() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let cameras = common::create_category(&pool, "Cameras").await?;
    let lenses = common::create_category(&pool, "Lenses").await?;
    let service = item_service(&pool);

    for (category, title, price) in [
        (cameras.id, "Rangefinder camera", 120_000),
        (cameras.id, "Point and shoot", 15_000),
        (lenses.id, "Portrait lens", 60_000),
    ] {
        let item = service
            .submit_item(seller.id, listing(category, title, price))
            .await?;
        service.approve(item.id).await?;
    }

    let filter = ItemFilter {
        category_id: Some(cameras.id),
        ..Default::default()
    };
    assert_eq!(service.browse(&filter).await?.len(), 2);

    let filter = ItemFilter {
        query: Some("lens".to_string()),
        ..Default::default()
    };
    let found = service.browse(&filter).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Portrait lens");

    let filter = ItemFilter {
        min_price: Some(20_000),
        max_price: Some(100_000),
        ..Default::default()
    };
    let found = service.browse(&filter).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].price_minor, 60_000);

    Ok(())
}

#[tokio::test]
async fn test_submission_validation() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let category = common::create_category(&pool, "Misc").await?;
    let service = item_service(&pool);

    // Empty title
    let mut request = listing(category.id, "x", 1_000);
    request.title = String::new();
    let err = service.submit_item(seller.id, request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Zero price
    let request = listing(category.id, "Free stuff", 0);
    let err = service.submit_item(seller.id, request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Unknown category
    let request = listing(Uuid::new_v4(), "Orphan", 1_000);
    let err = service.submit_item(seller.id, request).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
