pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/items", item_routes(state.clone()))
        .nest("/purchases", purchase_routes(state.clone()))
        .nest("/payout-info", payout_routes(state.clone()))
        .nest("/chat", chat_routes(state.clone()))
        .nest("/notifications", notification_routes(state))
}

fn item_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (no auth required for browsing)
        .route("/", get(handlers::items::browse))
        .route("/categories", get(handlers::items::list_categories))
        .route("/:id", get(handlers::items::get))
        // Protected routes - listing submission requires auth
        .nest("/", Router::new()
            .route("/", post(handlers::items::submit))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn purchase_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::escrow::create))
        .route("/", get(handlers::escrow::list))
        .route("/paid", post(handlers::escrow::mark_paid))
        .route("/ref/:reference", get(handlers::escrow::get_by_reference))
        .route("/:id/delivered", post(handlers::escrow::mark_delivered))
        .route("/:id/confirm", post(handlers::escrow::confirm_receipt))
        .route("/:id/dispute", post(handlers::escrow::raise_dispute))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn payout_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::payouts::get_own))
        .route("/", put(handlers::payouts::upsert_own))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:item_id/:peer_id", get(handlers::chat::conversation))
        .route("/:item_id/:peer_id", post(handlers::chat::send))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::notifications::list))
        .route("/:id/read", post(handlers::notifications::mark_read))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/items/pending", get(handlers::admin::list_pending_items))
        .route("/items/:id/approve", post(handlers::admin::approve_item))
        .route("/items/:id/reject", post(handlers::admin::reject_item))
        .route("/purchases", get(handlers::admin::list_purchases))
        .route("/purchases/:id/release", post(handlers::admin::release_funds))
        .route("/escrow/auto-release", post(handlers::admin::run_auto_release))
        .route("/payout-info", get(handlers::admin::list_payout_info))
        .route("/payout-info/:seller_id/verify", post(handlers::admin::verify_payout_info))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ))
        .with_state(state)
}
