use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreatePurchaseRequest, EscrowStatus, Purchase, PurchaseDetail},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct PurchaseDto {
    pub id: Uuid,
    pub payment_reference: String,
    pub item_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount_minor: i64,
    pub status: EscrowStatus,
    pub dispute_reason: Option<String>,
    pub delivered_at: Option<String>,
    pub confirmed_at: Option<String>,
    pub released_at: Option<String>,
    pub created_at: String,
}

impl From<Purchase> for PurchaseDto {
    fn from(p: Purchase) -> Self {
        Self {
            id: p.id,
            payment_reference: p.payment_reference,
            item_id: p.item_id,
            buyer_id: p.buyer_id,
            seller_id: p.seller_id,
            amount_minor: p.amount_minor,
            status: p.status,
            dispute_reason: p.dispute_reason,
            delivered_at: p.delivered_at.map(|dt| dt.to_rfc3339()),
            confirmed_at: p.confirmed_at.map(|dt| dt.to_rfc3339()),
            released_at: p.released_at.map(|dt| dt.to_rfc3339()),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub purchases: Vec<PurchaseDto>,
    pub total: usize,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseDto>)> {
    let purchase = state
        .service_context
        .escrow_service
        .create_purchase(current.user.id, request.item_id)
        .await?;

    Ok((StatusCode::CREATED, Json(purchase.into())))
}

/// Admins see every transaction; everyone else sees the purchases
/// they are buyer or seller on.
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ListResponse>> {
    let purchases = state
        .service_context
        .escrow_service
        .transactions_for(Some(current.user.id), current.is_admin)
        .await?;

    let total = purchases.len();
    let purchases: Vec<PurchaseDto> = purchases.into_iter().map(Into::into).collect();

    Ok(Json(ListResponse { purchases, total }))
}

pub async fn get_by_reference(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(reference): Path<String>,
) -> Result<Json<PurchaseDetail>> {
    let detail = state
        .service_context
        .escrow_service
        .transaction_by_reference(&reference)
        .await?;

    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    pub reference: String,
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Json(request): Json<MarkPaidRequest>,
) -> Result<Json<PurchaseDto>> {
    let purchase = state
        .service_context
        .escrow_service
        .mark_paid(&request.reference)
        .await?;

    Ok(Json(purchase.into()))
}

pub async fn mark_delivered(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseDto>> {
    let purchase = state
        .service_context
        .escrow_service
        .mark_delivered(id)
        .await?;

    Ok(Json(purchase.into()))
}

pub async fn confirm_receipt(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseDto>> {
    let purchase = state
        .service_context
        .escrow_service
        .confirm_receipt(id, current.user.id)
        .await?;

    Ok(Json(purchase.into()))
}

#[derive(Debug, Deserialize)]
pub struct DisputeRequest {
    pub reason: String,
}

pub async fn raise_dispute(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<DisputeRequest>,
) -> Result<Json<PurchaseDto>> {
    let purchase = state
        .service_context
        .escrow_service
        .raise_dispute(id, current.user.id, &request.reason)
        .await?;

    Ok(Json(purchase.into()))
}
