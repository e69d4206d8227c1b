use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::ChatMessage,
    error::{AppError, Result},
    repository::ChatRepository,
};

#[derive(FromRow)]
struct ChatMessageRow {
    id: String,
    item_id: String,
    sender_id: String,
    recipient_id: String,
    body: String,
    created_at: NaiveDateTime,
}

pub struct SqliteChatRepository {
    pool: SqlitePool,
}

impl SqliteChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: ChatMessageRow) -> Result<ChatMessage> {
        Ok(ChatMessage {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            item_id: Uuid::parse_str(&row.item_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            sender_id: Uuid::parse_str(&row.sender_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            recipient_id: Uuid::parse_str(&row.recipient_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            body: row.body,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl ChatRepository for SqliteChatRepository {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, item_id, sender_id, recipient_id, body, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.item_id.to_string())
        .bind(message.sender_id.to_string())
        .bind(message.recipient_id.to_string())
        .bind(&message.body)
        .bind(message.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(message)
    }

    async fn list_conversation(
        &self,
        item_id: Uuid,
        user_a: Uuid,
        user_b: Uuid,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>> {
        let mut sql = String::from(
            r#"
            SELECT id, item_id, sender_id, recipient_id, body, created_at
            FROM chat_messages
            WHERE item_id = ?
              AND ((sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?))
            "#,
        );
        if after.is_some() {
            sql.push_str(" AND created_at > ?");
        }
        sql.push_str(" ORDER BY created_at ASC");

        let a = user_a.to_string();
        let b = user_b.to_string();
        let mut query = sqlx::query_as::<_, ChatMessageRow>(&sql)
            .bind(item_id.to_string())
            .bind(&a)
            .bind(&b)
            .bind(&b)
            .bind(&a);
        if let Some(after) = after {
            query = query.bind(after.naive_utc());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_message).collect()
    }
}
