use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    domain::{
        EscrowEvent, EscrowStatus, ItemStatus, NotificationKind, Purchase, PurchaseDetail,
    },
    error::{AppError, Result},
    repository::{
        ItemRepository, NotificationRepository, PartyFilter, PayoutRepository, PurchaseRepository,
    },
};

/// Drives the purchase lifecycle. Every transition goes through the
/// repository's preconditioned UPDATE; this layer adds ownership
/// scoping, notification fan-out, and the cross-entity effects
/// (marking items sold).
pub struct EscrowService {
    purchase_repo: Arc<dyn PurchaseRepository>,
    item_repo: Arc<dyn ItemRepository>,
    payout_repo: Arc<dyn PayoutRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    auto_release_days: i64,
}

impl EscrowService {
    pub fn new(
        purchase_repo: Arc<dyn PurchaseRepository>,
        item_repo: Arc<dyn ItemRepository>,
        payout_repo: Arc<dyn PayoutRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        auto_release_days: i64,
    ) -> Self {
        Self {
            purchase_repo,
            item_repo,
            payout_repo,
            notification_repo,
            auto_release_days,
        }
    }

    pub async fn create_purchase(&self, buyer_id: Uuid, item_id: Uuid) -> Result<Purchase> {
        let item = self
            .item_repo
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        if item.status != ItemStatus::Approved {
            return Err(AppError::Conflict("Item is not available for sale".to_string()));
        }
        if item.seller_id == buyer_id {
            return Err(AppError::BadRequest("Cannot buy your own item".to_string()));
        }

        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4(),
            payment_reference: generate_payment_reference(),
            item_id: item.id,
            buyer_id,
            seller_id: item.seller_id,
            amount_minor: item.price_minor,
            status: EscrowStatus::Pending,
            dispute_reason: None,
            delivered_at: None,
            confirmed_at: None,
            released_at: None,
            created_at: now,
            updated_at: now,
        };

        let purchase = self.purchase_repo.create(purchase).await?;

        self.notify(
            purchase.seller_id,
            NotificationKind::PurchaseCreated,
            &format!("Your item \"{}\" has a pending purchase", item.title),
        )
        .await;

        Ok(purchase)
    }

    /// Records a payment by gateway reference. PENDING -> PAID.
    pub async fn mark_paid(&self, reference: &str) -> Result<Purchase> {
        let purchase = self
            .purchase_repo
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))?;

        let purchase = self
            .purchase_repo
            .apply_event(purchase.id, EscrowEvent::PaymentReceived, PartyFilter::Any, None)
            .await?;

        self.notify(
            purchase.seller_id,
            NotificationKind::PaymentReceived,
            "Payment received; please deliver the item",
        )
        .await;
        self.notify(
            purchase.buyer_id,
            NotificationKind::PaymentReceived,
            "Your payment is held in escrow",
        )
        .await;

        Ok(purchase)
    }

    /// PAID -> DELIVERED, stamping delivered_at.
    pub async fn mark_delivered(&self, id: Uuid) -> Result<Purchase> {
        let purchase = self
            .purchase_repo
            .apply_event(id, EscrowEvent::Delivered, PartyFilter::Any, None)
            .await?;

        self.notify(
            purchase.buyer_id,
            NotificationKind::ItemDelivered,
            "Your item was marked delivered; confirm receipt to release funds",
        )
        .await;

        Ok(purchase)
    }

    /// DELIVERED -> CONFIRMED. Only the buyer on the row may confirm;
    /// anyone else fails without mutating status.
    pub async fn confirm_receipt(&self, id: Uuid, buyer_id: Uuid) -> Result<Purchase> {
        let purchase = self
            .purchase_repo
            .apply_event(id, EscrowEvent::ReceiptConfirmed, PartyFilter::Buyer(buyer_id), None)
            .await?;

        self.notify(
            purchase.seller_id,
            NotificationKind::ReceiptConfirmed,
            "The buyer confirmed receipt",
        )
        .await;

        Ok(purchase)
    }

    /// CONFIRMED -> RELEASED. Marks the item sold. Retrying on an
    /// already-RELEASED row succeeds but must not repeat the release
    /// side effects, so those only run when the row actually moved.
    pub async fn release_funds(&self, id: Uuid) -> Result<Purchase> {
        let already_released = self
            .purchase_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))?
            .status
            == EscrowStatus::Released;

        let purchase = self
            .purchase_repo
            .apply_event(id, EscrowEvent::FundsReleased, PartyFilter::Any, None)
            .await?;

        if !already_released {
            self.finish_release(&purchase).await;
        }

        Ok(purchase)
    }

    /// Raises a dispute from PAID or DELIVERED. Only a party to the
    /// purchase may dispute; the reason is persisted on the row.
    pub async fn raise_dispute(&self, id: Uuid, user_id: Uuid, reason: &str) -> Result<Purchase> {
        if reason.trim().is_empty() {
            return Err(AppError::BadRequest("Dispute reason is required".to_string()));
        }

        let purchase = self
            .purchase_repo
            .apply_event(
                id,
                EscrowEvent::DisputeRaised,
                PartyFilter::BuyerOrSeller(user_id),
                Some(reason),
            )
            .await?;

        let other_party = if purchase.buyer_id == user_id {
            purchase.seller_id
        } else {
            purchase.buyer_id
        };
        self.notify(
            other_party,
            NotificationKind::DisputeRaised,
            &format!("A dispute was raised: {}", reason),
        )
        .await;

        Ok(purchase)
    }

    /// Releases every purchase that has sat in DELIVERED past the
    /// waiting period with no buyer action. Each row goes through its
    /// own preconditioned UPDATE, so a concurrent sweep (or a buyer
    /// confirming mid-sweep) cannot double-process it, and a crash
    /// needs no checkpoint: the next sweep re-selects the remainder.
    pub async fn process_auto_releases(&self) -> Result<Vec<Purchase>> {
        let cutoff = Utc::now() - Duration::days(self.auto_release_days);
        let due = self.purchase_repo.list_delivered_before(cutoff).await?;

        let mut released = Vec::new();
        for purchase in due {
            match self
                .purchase_repo
                .apply_event(purchase.id, EscrowEvent::AutoReleased, PartyFilter::Any, None)
                .await
            {
                Ok(updated) => {
                    self.finish_release(&updated).await;
                    released.push(updated);
                }
                Err(AppError::InvalidTransition(_)) => {
                    // Raced with a confirm or dispute since the select; skip.
                    tracing::debug!("Purchase {} left DELIVERED before auto-release", purchase.id);
                }
                Err(e) => return Err(e),
            }
        }

        if !released.is_empty() {
            tracing::info!("Auto-released {} purchase(s)", released.len());
        }

        Ok(released)
    }

    pub async fn transactions_for(&self, user_id: Option<Uuid>, is_admin: bool) -> Result<Vec<Purchase>> {
        if is_admin {
            return self.purchase_repo.list_all().await;
        }
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        self.purchase_repo.list_for_user(user_id).await
    }

    pub async fn transaction_by_reference(&self, reference: &str) -> Result<PurchaseDetail> {
        self.purchase_repo
            .find_detail_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))
    }

    async fn finish_release(&self, purchase: &Purchase) {
        // The purchase is RELEASED; the item it covered is gone.
        if let Err(e) = self.item_repo.set_status(purchase.item_id, ItemStatus::Sold).await {
            tracing::error!("Failed to mark item {} sold: {}", purchase.item_id, e);
        }

        match self.payout_repo.find_by_seller(purchase.seller_id).await {
            Ok(Some(info)) if info.is_verified => {
                // TODO: initiate the bank transfer once a payout provider is integrated.
                tracing::info!(
                    "Funds released for purchase {}; payout of {} minor units due to seller {}",
                    purchase.id,
                    purchase.amount_minor,
                    purchase.seller_id
                );
            }
            Ok(_) => {
                tracing::warn!(
                    "Funds released for purchase {} but seller {} has no verified payout info",
                    purchase.id,
                    purchase.seller_id
                );
            }
            Err(e) => {
                tracing::error!("Failed to look up payout info: {}", e);
            }
        }

        self.notify(
            purchase.seller_id,
            NotificationKind::FundsReleased,
            "Funds for your sale have been released",
        )
        .await;
    }

    // Notifications never fail a transition; a lost notification is
    // logged and dropped.
    async fn notify(&self, user_id: Uuid, kind: NotificationKind, body: &str) {
        if let Err(e) = self.notification_repo.create(user_id, kind, body).await {
            tracing::error!("Failed to create notification for {}: {}", user_id, e);
        }
    }
}

fn generate_payment_reference() -> String {
    format!("TRV-{}", Uuid::new_v4().simple())
}
