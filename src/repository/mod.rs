use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod item_repository;
pub mod purchase_repository;
pub mod payout_repository;
pub mod chat_repository;
pub mod notification_repository;

pub use user_repository::SqliteUserRepository;
pub use item_repository::SqliteItemRepository;
pub use purchase_repository::SqlitePurchaseRepository;
pub use payout_repository::SqlitePayoutRepository;
pub use chat_repository::SqliteChatRepository;
pub use notification_repository::SqliteNotificationRepository;

/// Restricts a transition to a party on the purchase row. The filter
/// is pushed into the UPDATE's WHERE clause so an unauthorized caller
/// cannot mutate status even under concurrent requests.
#[derive(Debug, Clone, Copy)]
pub enum PartyFilter {
    Any,
    Buyer(Uuid),
    BuyerOrSeller(Uuid),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, seller_id: Uuid, request: CreateItemRequest) -> Result<Item>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>>;
    async fn list_approved(&self, filter: &ItemFilter) -> Result<Vec<Item>>;
    async fn list_by_status(&self, status: ItemStatus) -> Result<Vec<Item>>;
    async fn set_status(&self, id: Uuid, status: ItemStatus) -> Result<Item>;
    async fn create_category(&self, name: &str, slug: &str) -> Result<Category>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    async fn create(&self, purchase: Purchase) -> Result<Purchase>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>>;
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Purchase>>;
    async fn find_detail_by_reference(&self, reference: &str) -> Result<Option<PurchaseDetail>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Purchase>>;
    async fn list_all(&self) -> Result<Vec<Purchase>>;
    async fn list_delivered_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Purchase>>;

    /// Applies one escrow event as a single status-preconditioned
    /// UPDATE. Fails with InvalidTransition when the row is in a
    /// status the event may not fire from, Forbidden when the party
    /// filter excludes the caller, NotFound when the row is missing.
    async fn apply_event(
        &self,
        id: Uuid,
        event: EscrowEvent,
        party: PartyFilter,
        dispute_reason: Option<&str>,
    ) -> Result<Purchase>;
}

#[async_trait]
pub trait PayoutRepository: Send + Sync {
    async fn upsert(&self, seller_id: Uuid, request: UpsertPaymentInfoRequest) -> Result<SellerPaymentInfo>;
    async fn find_by_seller(&self, seller_id: Uuid) -> Result<Option<SellerPaymentInfo>>;
    async fn list(&self) -> Result<Vec<SellerPaymentInfo>>;
    async fn set_verified(&self, seller_id: Uuid, verified: bool) -> Result<SellerPaymentInfo>;
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage>;
    async fn list_conversation(
        &self,
        item_id: Uuid,
        user_a: Uuid,
        user_b: Uuid,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, kind: NotificationKind, body: &str) -> Result<Notification>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<()>;
}
