use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Notification, NotificationKind},
    error::{AppError, Result},
    repository::NotificationRepository,
};

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    kind: String,
    body: String,
    read: bool,
    created_at: NaiveDateTime,
}

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: NotificationRow) -> Result<Notification> {
        Ok(Notification {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            kind: Self::parse_kind(&row.kind)?,
            body: row.body,
            read: row.read,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn parse_kind(s: &str) -> Result<NotificationKind> {
        match s {
            "PURCHASE_CREATED" => Ok(NotificationKind::PurchaseCreated),
            "PAYMENT_RECEIVED" => Ok(NotificationKind::PaymentReceived),
            "ITEM_DELIVERED" => Ok(NotificationKind::ItemDelivered),
            "RECEIPT_CONFIRMED" => Ok(NotificationKind::ReceiptConfirmed),
            "FUNDS_RELEASED" => Ok(NotificationKind::FundsReleased),
            "DISPUTE_RAISED" => Ok(NotificationKind::DisputeRaised),
            "ITEM_APPROVED" => Ok(NotificationKind::ItemApproved),
            "ITEM_REJECTED" => Ok(NotificationKind::ItemRejected),
            _ => Err(AppError::Database(format!("Invalid notification kind: {}", s))),
        }
    }

    fn kind_to_str(kind: NotificationKind) -> &'static str {
        match kind {
            NotificationKind::PurchaseCreated => "PURCHASE_CREATED",
            NotificationKind::PaymentReceived => "PAYMENT_RECEIVED",
            NotificationKind::ItemDelivered => "ITEM_DELIVERED",
            NotificationKind::ReceiptConfirmed => "RECEIPT_CONFIRMED",
            NotificationKind::FundsReleased => "FUNDS_RELEASED",
            NotificationKind::DisputeRaised => "DISPUTE_RAISED",
            NotificationKind::ItemApproved => "ITEM_APPROVED",
            NotificationKind::ItemRejected => "ITEM_REJECTED",
        }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        body: &str,
    ) -> Result<Notification> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, body, read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(Self::kind_to_str(kind))
        .bind(body)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Notification {
            id,
            user_id,
            kind,
            body: body.to_string(),
            read: false,
            created_at: now,
        })
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, kind, body, read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE notifications SET read = 1 WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}
