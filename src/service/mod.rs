pub mod authz;
pub mod chat_service;
pub mod escrow_service;
pub mod item_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::repository::*;

pub use authz::AdminDirectory;
pub use chat_service::ChatService;
pub use escrow_service::EscrowService;
pub use item_service::ItemService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub item_repo: Arc<dyn ItemRepository>,
    pub purchase_repo: Arc<dyn PurchaseRepository>,
    pub payout_repo: Arc<dyn PayoutRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub escrow_service: Arc<EscrowService>,
    pub item_service: Arc<ItemService>,
    pub chat_service: Arc<ChatService>,
    pub auth_service: Arc<AuthService>,
    pub admin_directory: Arc<AdminDirectory>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        item_repo: Arc<dyn ItemRepository>,
        purchase_repo: Arc<dyn PurchaseRepository>,
        payout_repo: Arc<dyn PayoutRepository>,
        chat_repo: Arc<dyn ChatRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        auth_service: Arc<AuthService>,
        admin_directory: Arc<AdminDirectory>,
        auto_release_days: i64,
        db_pool: SqlitePool,
    ) -> Self {
        let escrow_service = Arc::new(EscrowService::new(
            purchase_repo.clone(),
            item_repo.clone(),
            payout_repo.clone(),
            notification_repo.clone(),
            auto_release_days,
        ));
        let item_service = Arc::new(ItemService::new(
            item_repo.clone(),
            notification_repo.clone(),
        ));
        let chat_service = Arc::new(ChatService::new(chat_repo, item_repo.clone()));

        Self {
            user_repo,
            item_repo,
            purchase_repo,
            payout_repo,
            notification_repo,
            escrow_service,
            item_service,
            chat_service,
            auth_service,
            admin_directory,
            db_pool,
        }
    }
}
