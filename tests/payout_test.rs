mod common;

use trove::domain::{EscrowStatus, NotificationKind, UpsertPaymentInfoRequest};
use trove::error::AppError;
use trove::repository::{
    NotificationRepository, PayoutRepository, SqliteNotificationRepository, SqlitePayoutRepository,
};

fn bank_details(account_number: &str) -> UpsertPaymentInfoRequest {
    UpsertPaymentInfoRequest {
        bank_name: "First Example Bank".to_string(),
        account_name: "Seller Person".to_string(),
        account_number: account_number.to_string(),
    }
}

#[tokio::test]
async fn test_upsert_and_verify_payment_info() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let repo = SqlitePayoutRepository::new(pool.clone());

    let info = repo.upsert(seller.id, bank_details("0011223344")).await?;
    assert!(!info.is_verified);
    assert_eq!(info.account_number, "0011223344");

    let info = repo.set_verified(seller.id, true).await?;
    assert!(info.is_verified);

    // Changing bank details resets verification
    let info = repo.upsert(seller.id, bank_details("9988776655")).await?;
    assert!(!info.is_verified);
    assert_eq!(info.account_number, "9988776655");

    // One row per seller
    assert_eq!(repo.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_verify_unknown_seller_is_not_found() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let repo = SqlitePayoutRepository::new(pool.clone());

    let err = repo.set_verified(seller.id, true).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_escrow_transitions_notify_the_parties() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Watches").await?;
    let item = common::create_approved_item(&pool, seller.id, category.id, "Diver", 70_000).await?;

    let escrow = common::escrow_service(&pool, 14);
    let purchase = escrow.create_purchase(buyer.id, item.id).await?;
    escrow.mark_paid(&purchase.payment_reference).await?;
    escrow.mark_delivered(purchase.id).await?;

    let notifications = SqliteNotificationRepository::new(pool.clone());

    let seller_inbox = notifications.list_for_user(seller.id).await?;
    assert!(seller_inbox
        .iter()
        .any(|n| n.kind == NotificationKind::PurchaseCreated));
    assert!(seller_inbox
        .iter()
        .any(|n| n.kind == NotificationKind::PaymentReceived));

    let buyer_inbox = notifications.list_for_user(buyer.id).await?;
    assert!(buyer_inbox
        .iter()
        .any(|n| n.kind == NotificationKind::ItemDelivered));

    // Mark one read; ownership is enforced
    let first = &buyer_inbox[0];
    notifications.mark_read(first.id, buyer.id).await?;
    let err = notifications
        .mark_read(first.id, seller.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_repeated_release_notifies_the_seller_once() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Audio").await?;
    let item =
        common::create_approved_item(&pool, seller.id, category.id, "Turntable", 95_000).await?;

    let escrow = common::escrow_service(&pool, 14);
    let purchase = escrow.create_purchase(buyer.id, item.id).await?;
    escrow.mark_paid(&purchase.payment_reference).await?;
    escrow.mark_delivered(purchase.id).await?;
    escrow.confirm_receipt(purchase.id, buyer.id).await?;

    let first = escrow.release_funds(purchase.id).await?;
    assert_eq!(first.status, EscrowStatus::Released);

    // An admin double-click retries the release. The state stays
    // RELEASED and the seller is not notified a second time.
    let second = escrow.release_funds(purchase.id).await?;
    assert_eq!(second.status, EscrowStatus::Released);

    let notifications = SqliteNotificationRepository::new(pool.clone());
    let release_notes = notifications
        .list_for_user(seller.id)
        .await?
        .into_iter()
        .filter(|n| n.kind == NotificationKind::FundsReleased)
        .count();
    assert_eq!(release_notes, 1);

    Ok(())
}
