use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{SellerPaymentInfo, UpsertPaymentInfoRequest},
    error::{AppError, Result},
    repository::PayoutRepository,
};

pub async fn get_own(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SellerPaymentInfo>> {
    let info = state
        .service_context
        .payout_repo
        .find_by_seller(current.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment info not found".to_string()))?;

    Ok(Json(info))
}

pub async fn upsert_own(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<UpsertPaymentInfoRequest>,
) -> Result<Json<SellerPaymentInfo>> {
    use validator::Validate;
    request.validate()?;

    let info = state
        .service_context
        .payout_repo
        .upsert(current.user.id, request)
        .await?;

    Ok(Json(info))
}
