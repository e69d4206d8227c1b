use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{
        handlers::escrow::PurchaseDto,
        handlers::items::ItemDto,
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::SellerPaymentInfo,
    error::Result,
    repository::PayoutRepository,
};

pub async fn list_pending_items(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
) -> Result<Json<Vec<ItemDto>>> {
    let items = state.service_context.item_service.list_pending().await?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn approve_item(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemDto>> {
    let item = state.service_context.item_service.approve(id).await?;

    Ok(Json(item.into()))
}

pub async fn reject_item(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemDto>> {
    let item = state.service_context.item_service.reject(id).await?;

    Ok(Json(item.into()))
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
) -> Result<Json<Vec<PurchaseDto>>> {
    let purchases = state
        .service_context
        .escrow_service
        .transactions_for(None, true)
        .await?;

    Ok(Json(purchases.into_iter().map(Into::into).collect()))
}

pub async fn release_funds(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseDto>> {
    let purchase = state.service_context.escrow_service.release_funds(id).await?;

    Ok(Json(purchase.into()))
}

#[derive(Debug, Serialize)]
pub struct AutoReleaseResponse {
    pub released: Vec<PurchaseDto>,
    pub count: usize,
}

pub async fn run_auto_release(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
) -> Result<Json<AutoReleaseResponse>> {
    let released = state
        .service_context
        .escrow_service
        .process_auto_releases()
        .await?;

    let count = released.len();
    let released: Vec<PurchaseDto> = released.into_iter().map(Into::into).collect();

    Ok(Json(AutoReleaseResponse { released, count }))
}

pub async fn list_payout_info(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
) -> Result<Json<Vec<SellerPaymentInfo>>> {
    let records = state.service_context.payout_repo.list().await?;

    Ok(Json(records))
}

pub async fn verify_payout_info(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(seller_id): Path<Uuid>,
) -> Result<Json<SellerPaymentInfo>> {
    let info = state
        .service_context
        .payout_repo
        .set_verified(seller_id, true)
        .await?;

    Ok(Json(info))
}
