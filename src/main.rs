mod api;
mod auth;
mod config;
mod domain;
mod error;
mod repository;
mod service;

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Settings,
    service::{AdminDirectory, ServiceContext},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trove=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Trove server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Admin allow-list, parsed once
    let admin_directory = Arc::new(AdminDirectory::from_allow_list(&settings.admin.emails));
    if admin_directory.is_empty() {
        tracing::warn!("Admin allow-list is empty; admin routes are unreachable");
    }

    // Initialize auth service
    let auth_service = Arc::new(auth::AuthService::new(db_pool.clone()));
    match auth_service.cleanup_expired_sessions().await {
        Ok(removed) if removed > 0 => tracing::info!("Removed {} expired session(s)", removed),
        Ok(_) => {}
        Err(e) => tracing::warn!("Session cleanup failed: {}", e),
    }

    // Initialize repositories
    let user_repo = Arc::new(repository::SqliteUserRepository::new(db_pool.clone()));
    let item_repo = Arc::new(repository::SqliteItemRepository::new(db_pool.clone()));
    let purchase_repo = Arc::new(repository::SqlitePurchaseRepository::new(db_pool.clone()));
    let payout_repo = Arc::new(repository::SqlitePayoutRepository::new(db_pool.clone()));
    let chat_repo = Arc::new(repository::SqliteChatRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(repository::SqliteNotificationRepository::new(db_pool.clone()));

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        user_repo,
        item_repo,
        purchase_repo,
        payout_repo,
        chat_repo,
        notification_repo,
        auth_service,
        admin_directory,
        settings.escrow.auto_release_days,
        db_pool.clone(),
    ));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
