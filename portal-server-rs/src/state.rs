use crate::config::AppConfig;
use crate::services::backup::BackupService;
use crate::store::StoreClient;
use std::sync::Arc;

pub struct AppState {
    pub store: Arc<dyn StoreClient>,
    pub config: AppConfig,
    pub backups: BackupService,
}

impl AppState {
    pub fn new(store: Arc<dyn StoreClient>, config: AppConfig) -> Self {
        let backups = BackupService::new(store.clone(), config.backup_bucket.clone());
        Self { store, config, backups }
    }
}
