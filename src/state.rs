use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{Mailer, SonglinkService, StorageService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: ConnectionManager,
    pub config: Arc<Config>,
    pub storage: StorageService,
    pub mailer: Mailer,
    pub songlink: SonglinkService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, redis: ConnectionManager, config: Config) -> Self {
        let storage = StorageService::new(&config.upload_dir);
        let mailer = Mailer::from_config(&config);
        let songlink = SonglinkService::new(config.songlink_api_url.clone());

        Self {
            db,
            redis,
            config: Arc::new(config),
            storage,
            mailer,
            songlink,
        }
    }
}
