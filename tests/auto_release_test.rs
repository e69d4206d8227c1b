mod common;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use trove::domain::{EscrowEvent, EscrowStatus, ItemStatus};
use trove::error::AppError;
use trove::repository::{
    ItemRepository, PartyFilter, PurchaseRepository, SqliteItemRepository,
    SqlitePurchaseRepository,
};
use uuid::Uuid;

async fn backdate_delivery(pool: &SqlitePool, purchase_id: Uuid, days: i64) -> anyhow::Result<()> {
    let past = (Utc::now() - Duration::days(days)).naive_utc();
    sqlx::query("UPDATE purchases SET delivered_at = ? WHERE id = ?")
        .bind(past)
        .bind(purchase_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_auto_release_picks_only_stale_deliveries() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Bikes").await?;

    let escrow = common::escrow_service(&pool, 14);

    // Delivered 15 days ago: due
    let item_stale =
        common::create_approved_item(&pool, seller.id, category.id, "Road bike", 90_000).await?;
    let stale = escrow.create_purchase(buyer.id, item_stale.id).await?;
    escrow.mark_paid(&stale.payment_reference).await?;
    escrow.mark_delivered(stale.id).await?;
    backdate_delivery(&pool, stale.id, 15).await?;

    // Delivered 10 days ago: not due
    let item_fresh =
        common::create_approved_item(&pool, seller.id, category.id, "City bike", 60_000).await?;
    let fresh = escrow.create_purchase(buyer.id, item_fresh.id).await?;
    escrow.mark_paid(&fresh.payment_reference).await?;
    escrow.mark_delivered(fresh.id).await?;
    backdate_delivery(&pool, fresh.id, 10).await?;

    // Still PAID: never eligible
    let item_paid =
        common::create_approved_item(&pool, seller.id, category.id, "Folding bike", 40_000).await?;
    let paid_only = escrow.create_purchase(buyer.id, item_paid.id).await?;
    escrow.mark_paid(&paid_only.payment_reference).await?;

    let released = escrow.process_auto_releases().await?;
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].id, stale.id);

    let repo = SqlitePurchaseRepository::new(pool.clone());

    let stale_row = repo.find_by_id(stale.id).await?.unwrap();
    assert_eq!(stale_row.status, EscrowStatus::Released);
    assert!(stale_row.released_at.is_some());

    // Everything outside the filter is untouched
    let fresh_row = repo.find_by_id(fresh.id).await?.unwrap();
    assert_eq!(fresh_row.status, EscrowStatus::Delivered);
    assert!(fresh_row.released_at.is_none());

    let paid_row = repo.find_by_id(paid_only.id).await?.unwrap();
    assert_eq!(paid_row.status, EscrowStatus::Paid);

    // The released purchase's item is sold
    let item_repo = SqliteItemRepository::new(pool.clone());
    let sold = item_repo.find_by_id(item_stale.id).await?.unwrap();
    assert_eq!(sold.status, ItemStatus::Sold);

    Ok(())
}

#[tokio::test]
async fn test_sweep_is_a_no_op_when_nothing_is_due() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Camping").await?;

    let escrow = common::escrow_service(&pool, 14);
    let item = common::create_approved_item(&pool, seller.id, category.id, "Tent", 25_000).await?;
    let purchase = escrow.create_purchase(buyer.id, item.id).await?;
    escrow.mark_paid(&purchase.payment_reference).await?;
    escrow.mark_delivered(purchase.id).await?;

    let released = escrow.process_auto_releases().await?;
    assert!(released.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_running_the_sweep_twice_releases_once() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Music").await?;

    let escrow = common::escrow_service(&pool, 14);
    let item = common::create_approved_item(&pool, seller.id, category.id, "Guitar", 80_000).await?;
    let purchase = escrow.create_purchase(buyer.id, item.id).await?;
    escrow.mark_paid(&purchase.payment_reference).await?;
    escrow.mark_delivered(purchase.id).await?;
    backdate_delivery(&pool, purchase.id, 20).await?;

    let first = escrow.process_auto_releases().await?;
    assert_eq!(first.len(), 1);

    // Already RELEASED; the filter no longer selects it
    let second = escrow.process_auto_releases().await?;
    assert!(second.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_overlapping_sweep_bounces_off_a_released_row() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Photography").await?;

    let escrow = common::escrow_service(&pool, 14);
    let item =
        common::create_approved_item(&pool, seller.id, category.id, "Film camera", 55_000).await?;
    let purchase = escrow.create_purchase(buyer.id, item.id).await?;
    escrow.mark_paid(&purchase.payment_reference).await?;
    escrow.mark_delivered(purchase.id).await?;
    backdate_delivery(&pool, purchase.id, 15).await?;

    let released = escrow.process_auto_releases().await?;
    assert_eq!(released.len(), 1);
    let released_at = released[0].released_at;
    assert!(released_at.is_some());

    // A second sweeper that selected this row while it was still
    // DELIVERED hits the status precondition instead of re-releasing.
    let repo = SqlitePurchaseRepository::new(pool.clone());
    let err = repo
        .apply_event(purchase.id, EscrowEvent::AutoReleased, PartyFilter::Any, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let row = repo.find_by_id(purchase.id).await?.unwrap();
    assert_eq!(row.status, EscrowStatus::Released);
    assert_eq!(row.released_at, released_at);

    Ok(())
}
