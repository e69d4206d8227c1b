use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{EscrowEvent, EscrowStatus, Purchase, PurchaseDetail},
    error::{AppError, Result},
    repository::{PartyFilter, PurchaseRepository},
};

#[derive(FromRow)]
struct PurchaseRow {
    id: String,
    payment_reference: String,
    item_id: String,
    buyer_id: String,
    seller_id: String,
    amount_minor: i64,
    status: String,
    dispute_reason: Option<String>,
    delivered_at: Option<NaiveDateTime>,
    confirmed_at: Option<NaiveDateTime>,
    released_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct PurchaseDetailRow {
    #[sqlx(flatten)]
    purchase: PurchaseRow,
    item_title: String,
    buyer_name: String,
    seller_name: String,
}

const PURCHASE_COLUMNS: &str = "id, payment_reference, item_id, buyer_id, seller_id, amount_minor, \
     status, dispute_reason, delivered_at, confirmed_at, released_at, created_at, updated_at";

pub struct SqlitePurchaseRepository {
    pool: SqlitePool,
}

impl SqlitePurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_purchase(row: PurchaseRow) -> Result<Purchase> {
        Ok(Purchase {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            payment_reference: row.payment_reference,
            item_id: Uuid::parse_str(&row.item_id).map_err(|e| AppError::Database(e.to_string()))?,
            buyer_id: Uuid::parse_str(&row.buyer_id).map_err(|e| AppError::Database(e.to_string()))?,
            seller_id: Uuid::parse_str(&row.seller_id).map_err(|e| AppError::Database(e.to_string()))?,
            amount_minor: row.amount_minor,
            status: Self::parse_status(&row.status)?,
            dispute_reason: row.dispute_reason,
            delivered_at: row.delivered_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            confirmed_at: row.confirmed_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            released_at: row.released_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<EscrowStatus> {
        match s {
            "PENDING" => Ok(EscrowStatus::Pending),
            "PAID" => Ok(EscrowStatus::Paid),
            "DELIVERED" => Ok(EscrowStatus::Delivered),
            "CONFIRMED" => Ok(EscrowStatus::Confirmed),
            "RELEASED" => Ok(EscrowStatus::Released),
            "DISPUTED" => Ok(EscrowStatus::Disputed),
            "REFUNDED" => Ok(EscrowStatus::Refunded),
            _ => Err(AppError::Database(format!("Invalid escrow status: {}", s))),
        }
    }

    fn status_to_str(status: EscrowStatus) -> &'static str {
        match status {
            EscrowStatus::Pending => "PENDING",
            EscrowStatus::Paid => "PAID",
            EscrowStatus::Delivered => "DELIVERED",
            EscrowStatus::Confirmed => "CONFIRMED",
            EscrowStatus::Released => "RELEASED",
            EscrowStatus::Disputed => "DISPUTED",
            EscrowStatus::Refunded => "REFUNDED",
        }
    }

    // Column stamped by the event alongside the status write, if any.
    fn timestamp_column(event: EscrowEvent) -> Option<&'static str> {
        match event {
            EscrowEvent::Delivered => Some("delivered_at"),
            EscrowEvent::ReceiptConfirmed => Some("confirmed_at"),
            EscrowEvent::FundsReleased | EscrowEvent::AutoReleased => Some("released_at"),
            EscrowEvent::PaymentReceived | EscrowEvent::DisputeRaised => None,
        }
    }
}

#[async_trait]
impl PurchaseRepository for SqlitePurchaseRepository {
    async fn create(&self, purchase: Purchase) -> Result<Purchase> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, payment_reference, item_id, buyer_id, seller_id,
                amount_minor, status, dispute_reason,
                delivered_at, confirmed_at, released_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(purchase.id.to_string())
        .bind(&purchase.payment_reference)
        .bind(purchase.item_id.to_string())
        .bind(purchase.buyer_id.to_string())
        .bind(purchase.seller_id.to_string())
        .bind(purchase.amount_minor)
        .bind(Self::status_to_str(purchase.status))
        .bind(&purchase.dispute_reason)
        .bind(purchase.delivered_at.map(|dt| dt.naive_utc()))
        .bind(purchase.confirmed_at.map(|dt| dt.naive_utc()))
        .bind(purchase.released_at.map(|dt| dt.naive_utc()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(purchase.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created purchase".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>> {
        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE id = ?",
            PURCHASE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_purchase(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Purchase>> {
        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE payment_reference = ?",
            PURCHASE_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_purchase(r)?)),
            None => Ok(None),
        }
    }

    async fn find_detail_by_reference(&self, reference: &str) -> Result<Option<PurchaseDetail>> {
        let row = sqlx::query_as::<_, PurchaseDetailRow>(
            r#"
            SELECT p.id, p.payment_reference, p.item_id, p.buyer_id, p.seller_id,
                   p.amount_minor, p.status, p.dispute_reason,
                   p.delivered_at, p.confirmed_at, p.released_at,
                   p.created_at, p.updated_at,
                   i.title AS item_title,
                   b.name AS buyer_name,
                   s.name AS seller_name
            FROM purchases p
            JOIN items i ON i.id = p.item_id
            JOIN users b ON b.id = p.buyer_id
            JOIN users s ON s.id = p.seller_id
            WHERE p.payment_reference = ?
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(PurchaseDetail {
                purchase: Self::row_to_purchase(r.purchase)?,
                item_title: r.item_title,
                buyer_name: r.buyer_name,
                seller_name: r.seller_name,
            })),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Purchase>> {
        let user_id_str = user_id.to_string();
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE buyer_id = ? OR seller_id = ? ORDER BY created_at DESC",
            PURCHASE_COLUMNS
        ))
        .bind(&user_id_str)
        .bind(&user_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_purchase).collect()
    }

    async fn list_all(&self) -> Result<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases ORDER BY created_at DESC",
            PURCHASE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_purchase).collect()
    }

    async fn list_delivered_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE status = 'DELIVERED' AND delivered_at <= ? ORDER BY delivered_at ASC",
            PURCHASE_COLUMNS
        ))
        .bind(cutoff.naive_utc())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_purchase).collect()
    }

    async fn apply_event(
        &self,
        id: Uuid,
        event: EscrowEvent,
        party: PartyFilter,
        dispute_reason: Option<&str>,
    ) -> Result<Purchase> {
        let now = Utc::now().naive_utc();
        let id_str = id.to_string();
        let target = Self::status_to_str(event.target());

        let allowed = event.allowed_from();
        let placeholders = vec!["?"; allowed.len()].join(", ");

        let stamp_column = Self::timestamp_column(event);
        let mut sql = String::from("UPDATE purchases SET status = ?, updated_at = ?");
        if let Some(column) = stamp_column {
            sql.push_str(&format!(", {} = ?", column));
        }
        if matches!(event, EscrowEvent::DisputeRaised) {
            sql.push_str(", dispute_reason = ?");
        }
        sql.push_str(&format!(" WHERE id = ? AND status IN ({})", placeholders));
        match party {
            PartyFilter::Any => {}
            PartyFilter::Buyer(_) => sql.push_str(" AND buyer_id = ?"),
            PartyFilter::BuyerOrSeller(_) => sql.push_str(" AND (buyer_id = ? OR seller_id = ?)"),
        }

        let mut query = sqlx::query(&sql).bind(target).bind(now);
        if stamp_column.is_some() {
            query = query.bind(now);
        }
        if matches!(event, EscrowEvent::DisputeRaised) {
            query = query.bind(dispute_reason);
        }
        query = query.bind(&id_str);
        for status in allowed {
            query = query.bind(Self::status_to_str(*status));
        }
        match party {
            PartyFilter::Any => {}
            PartyFilter::Buyer(user_id) => {
                query = query.bind(user_id.to_string());
            }
            PartyFilter::BuyerOrSeller(user_id) => {
                let user_id_str = user_id.to_string();
                query = query.bind(user_id_str.clone()).bind(user_id_str);
            }
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            return self.find_by_id(id).await?.ok_or_else(|| {
                AppError::Database("Failed to retrieve updated purchase".to_string())
            });
        }

        // Zero rows: re-read to tell the caller why nothing moved.
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))?;

        let party_matches = match party {
            PartyFilter::Any => true,
            PartyFilter::Buyer(user_id) => current.buyer_id == user_id,
            PartyFilter::BuyerOrSeller(user_id) => {
                current.buyer_id == user_id || current.seller_id == user_id
            }
        };
        if !party_matches {
            return Err(AppError::Forbidden);
        }

        match current.status.apply(event) {
            // The transition table allows it now, so a concurrent
            // writer moved the row between our UPDATE and this read.
            Some(_) => Err(AppError::Conflict(
                "Purchase was modified concurrently".to_string(),
            )),
            None => Err(AppError::InvalidTransition(format!(
                "Cannot apply {:?} while purchase is {}",
                event,
                Self::status_to_str(current.status)
            ))),
        }
    }
}
