use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{SellerPaymentInfo, UpsertPaymentInfoRequest},
    error::{AppError, Result},
    repository::PayoutRepository,
};

#[derive(FromRow)]
struct PaymentInfoRow {
    seller_id: String,
    bank_name: String,
    account_name: String,
    account_number: String,
    is_verified: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePayoutRepository {
    pool: SqlitePool,
}

impl SqlitePayoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_info(row: PaymentInfoRow) -> Result<SellerPaymentInfo> {
        Ok(SellerPaymentInfo {
            seller_id: Uuid::parse_str(&row.seller_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            bank_name: row.bank_name,
            account_name: row.account_name,
            account_number: row.account_number,
            is_verified: row.is_verified,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl PayoutRepository for SqlitePayoutRepository {
    async fn upsert(
        &self,
        seller_id: Uuid,
        request: UpsertPaymentInfoRequest,
    ) -> Result<SellerPaymentInfo> {
        let now = Utc::now().naive_utc();

        // Re-submitting bank details resets verification.
        sqlx::query(
            r#"
            INSERT INTO seller_payment_info (
                seller_id, bank_name, account_name, account_number,
                is_verified, created_at, updated_at
            ) VALUES (?, ?, ?, ?, 0, ?, ?)
            ON CONFLICT(seller_id) DO UPDATE SET
                bank_name = excluded.bank_name,
                account_name = excluded.account_name,
                account_number = excluded.account_number,
                is_verified = 0,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(seller_id.to_string())
        .bind(&request.bank_name)
        .bind(&request.account_name)
        .bind(&request.account_number)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_seller(seller_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve payment info".to_string())
        })
    }

    async fn find_by_seller(&self, seller_id: Uuid) -> Result<Option<SellerPaymentInfo>> {
        let row = sqlx::query_as::<_, PaymentInfoRow>(
            r#"
            SELECT seller_id, bank_name, account_name, account_number,
                   is_verified, created_at, updated_at
            FROM seller_payment_info
            WHERE seller_id = ?
            "#,
        )
        .bind(seller_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_info(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<SellerPaymentInfo>> {
        let rows = sqlx::query_as::<_, PaymentInfoRow>(
            r#"
            SELECT seller_id, bank_name, account_name, account_number,
                   is_verified, created_at, updated_at
            FROM seller_payment_info
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_info).collect()
    }

    async fn set_verified(&self, seller_id: Uuid, verified: bool) -> Result<SellerPaymentInfo> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            "UPDATE seller_payment_info SET is_verified = ?, updated_at = ? WHERE seller_id = ?",
        )
        .bind(verified)
        .bind(now)
        .bind(seller_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Payment info not found".to_string()));
        }

        self.find_by_seller(seller_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve payment info".to_string())
        })
    }
}
