use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchase doubles as the escrow transaction: one buyer, one seller,
/// one item, and a linear status field that only moves forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub payment_reference: String,
    pub item_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount_minor: i64,
    pub status: EscrowStatus,
    pub dispute_reason: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    Pending,
    Paid,
    Delivered,
    Confirmed,
    Released,
    Disputed,
    Refunded,
}

/// Events that drive the escrow lifecycle. Each maps to exactly one
/// target status; the statuses it may fire from are listed in
/// `allowed_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowEvent {
    PaymentReceived,
    Delivered,
    ReceiptConfirmed,
    FundsReleased,
    AutoReleased,
    DisputeRaised,
}

impl EscrowEvent {
    pub fn target(&self) -> EscrowStatus {
        match self {
            EscrowEvent::PaymentReceived => EscrowStatus::Paid,
            EscrowEvent::Delivered => EscrowStatus::Delivered,
            EscrowEvent::ReceiptConfirmed => EscrowStatus::Confirmed,
            EscrowEvent::FundsReleased => EscrowStatus::Released,
            EscrowEvent::AutoReleased => EscrowStatus::Released,
            EscrowEvent::DisputeRaised => EscrowStatus::Disputed,
        }
    }

    /// Statuses this event may legally fire from. User-invoked events
    /// include their own target, so retrying the call that produced
    /// the current status succeeds and refreshes its timestamp.
    /// AutoReleased does not: the sweep is never a user retry, and an
    /// overlapping sweep must bounce off the precondition rather than
    /// re-fire release side effects on an already-RELEASED row.
    pub fn allowed_from(&self) -> &'static [EscrowStatus] {
        match self {
            EscrowEvent::PaymentReceived => &[EscrowStatus::Pending, EscrowStatus::Paid],
            EscrowEvent::Delivered => &[EscrowStatus::Paid, EscrowStatus::Delivered],
            EscrowEvent::ReceiptConfirmed => &[EscrowStatus::Delivered, EscrowStatus::Confirmed],
            EscrowEvent::FundsReleased => &[EscrowStatus::Confirmed, EscrowStatus::Released],
            EscrowEvent::AutoReleased => &[EscrowStatus::Delivered],
            EscrowEvent::DisputeRaised => &[
                EscrowStatus::Paid,
                EscrowStatus::Delivered,
                EscrowStatus::Disputed,
            ],
        }
    }
}

impl EscrowStatus {
    /// The single transition function: (current, event) -> next status,
    /// or None when the event is out of order from here.
    pub fn apply(self, event: EscrowEvent) -> Option<EscrowStatus> {
        if event.allowed_from().contains(&self) {
            Some(event.target())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseRequest {
    pub item_id: Uuid,
}

/// Read model for the transaction page: the purchase joined with the
/// item title and both party names.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub item_title: String,
    pub buyer_name: String,
    pub seller_name: String,
}
