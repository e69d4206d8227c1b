use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One payout record per seller. Consulted when funds are released;
/// the actual transfer is out of scope until a payout provider exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerPaymentInfo {
    pub seller_id: Uuid,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertPaymentInfoRequest {
    #[validate(length(min = 1))]
    pub bank_name: String,
    #[validate(length(min = 1))]
    pub account_name: String,
    #[validate(length(min = 6, max = 32))]
    pub account_number: String,
}
