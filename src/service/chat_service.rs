use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{ChatMessage, SendMessageRequest},
    error::{AppError, Result},
    repository::{ChatRepository, ItemRepository},
};

pub struct ChatService {
    chat_repo: Arc<dyn ChatRepository>,
    item_repo: Arc<dyn ItemRepository>,
}

impl ChatService {
    pub fn new(chat_repo: Arc<dyn ChatRepository>, item_repo: Arc<dyn ItemRepository>) -> Self {
        Self {
            chat_repo,
            item_repo,
        }
    }

    /// Sends a message about an item. One side of the conversation
    /// must be the item's seller; you cannot message yourself.
    pub async fn send(
        &self,
        item_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        request: SendMessageRequest,
    ) -> Result<ChatMessage> {
        request.validate()?;

        if sender_id == recipient_id {
            return Err(AppError::BadRequest("Cannot message yourself".to_string()));
        }

        let item = self
            .item_repo
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        if item.seller_id != sender_id && item.seller_id != recipient_id {
            return Err(AppError::Forbidden);
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            item_id,
            sender_id,
            recipient_id,
            body: request.body,
            created_at: Utc::now(),
        };

        self.chat_repo.create(message).await
    }

    /// Fetches the conversation between the current user and a peer
    /// about one item. `after` lets clients poll for new messages.
    pub async fn conversation(
        &self,
        item_id: Uuid,
        user_id: Uuid,
        peer_id: Uuid,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>> {
        self.chat_repo
            .list_conversation(item_id, user_id, peer_id, after)
            .await
    }
}
