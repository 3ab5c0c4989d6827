use std::sync::Arc;

use crate::{config::AppConfig, store::CandidateStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CandidateStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CandidateStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn CandidateStore {
        self.store.as_ref()
    }
}
