use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::repository::GlossaryStore;
use crate::services::{GlossaryService, UploadPolicy};
use crate::storage::ObjectStorage;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<GlossaryService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn GlossaryStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        let uploads = UploadPolicy::from(&config.storage);
        Self {
            config: Arc::new(config),
            service: Arc::new(GlossaryService::new(store, storage, uploads)),
        }
    }
}
