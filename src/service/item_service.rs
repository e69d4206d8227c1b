use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{CreateItemRequest, Item, ItemFilter, ItemStatus, NotificationKind},
    error::{AppError, Result},
    repository::{ItemRepository, NotificationRepository},
};

pub struct ItemService {
    item_repo: Arc<dyn ItemRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
}

impl ItemService {
    pub fn new(
        item_repo: Arc<dyn ItemRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            item_repo,
            notification_repo,
        }
    }

    /// Seller submission; items start PENDING until an admin moderates.
    pub async fn submit_item(&self, seller_id: Uuid, request: CreateItemRequest) -> Result<Item> {
        request.validate()?;

        let categories = self.item_repo.list_categories().await?;
        if !categories.iter().any(|c| c.id == request.category_id) {
            return Err(AppError::BadRequest("Unknown category".to_string()));
        }

        self.item_repo.create(seller_id, request).await
    }

    pub async fn browse(&self, filter: &ItemFilter) -> Result<Vec<Item>> {
        self.item_repo.list_approved(filter).await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<Item> {
        self.item_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    pub async fn list_pending(&self) -> Result<Vec<Item>> {
        self.item_repo.list_by_status(ItemStatus::Pending).await
    }

    pub async fn approve(&self, id: Uuid) -> Result<Item> {
        self.moderate(id, ItemStatus::Approved, NotificationKind::ItemApproved)
            .await
    }

    pub async fn reject(&self, id: Uuid) -> Result<Item> {
        self.moderate(id, ItemStatus::Rejected, NotificationKind::ItemRejected)
            .await
    }

    async fn moderate(
        &self,
        id: Uuid,
        status: ItemStatus,
        kind: NotificationKind,
    ) -> Result<Item> {
        let item = self
            .item_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        if item.status != ItemStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Item has already been moderated ({:?})",
                item.status
            )));
        }

        let item = self.item_repo.set_status(id, status).await?;

        let verdict = match status {
            ItemStatus::Approved => "approved",
            _ => "rejected",
        };
        if let Err(e) = self
            .notification_repo
            .create(
                item.seller_id,
                kind,
                &format!("Your listing \"{}\" was {}", item.title, verdict),
            )
            .await
        {
            tracing::error!("Failed to create moderation notification: {}", e);
        }

        Ok(item)
    }
}
