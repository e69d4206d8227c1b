use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Category, CreateItemRequest, Item, ItemCondition, ItemFilter, ItemStatus},
    error::Result,
    repository::ItemRepository,
};

#[derive(Debug, Serialize)]
pub struct ItemDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_minor: i64,
    pub original_price_minor: Option<i64>,
    pub condition: ItemCondition,
    pub status: ItemStatus,
    pub category_id: Uuid,
    pub seller_id: Uuid,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: String,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            price_minor: item.price_minor,
            original_price_minor: item.original_price_minor,
            condition: item.condition,
            status: item.status,
            category_id: item.category_id,
            seller_id: item.seller_id,
            images: item.images,
            tags: item.tags,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<ItemDto>,
    pub total: usize,
}

pub async fn browse(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<ListResponse>> {
    let items = state.service_context.item_service.browse(&filter).await?;

    let total = items.len();
    let items: Vec<ItemDto> = items.into_iter().map(Into::into).collect();

    Ok(Json(ListResponse { items, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemDto>> {
    let item = state.service_context.item_service.get_item(id).await?;

    Ok(Json(item.into()))
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemDto>)> {
    let item = state
        .service_context
        .item_service
        .submit_item(current.user.id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    let categories = state.service_context.item_repo.list_categories().await?;

    Ok(Json(categories))
}
