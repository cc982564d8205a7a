//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::notifier::OrderNotifier;
use crate::repositories::{
    BookRepository, CartRepository, FavouriteRepository, OrderRepository, UserRepository,
};
use crate::session::SessionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub session_service: SessionService,
    pub user_repository: UserRepository,
    pub book_repository: BookRepository,
    pub cart_repository: CartRepository,
    pub favourite_repository: FavouriteRepository,
    pub order_repository: OrderRepository,
    pub notifier: OrderNotifier,
}

impl AppState {
    /// Assemble the state from a ready pool and configuration
    pub fn new(db_pool: PgPool, config: AppConfig) -> Self {
        let session_service = SessionService::new(&config);
        let notifier = OrderNotifier::new(
            config.order_webhook_url.clone(),
            config.admin_email.clone(),
        );

        AppState {
            user_repository: UserRepository::new(db_pool.clone()),
            book_repository: BookRepository::new(db_pool.clone()),
            cart_repository: CartRepository::new(db_pool.clone()),
            favourite_repository: FavouriteRepository::new(db_pool.clone()),
            order_repository: OrderRepository::new(db_pool.clone()),
            session_service,
            notifier,
            config: Arc::new(config),
            db_pool,
        }
    }
}
