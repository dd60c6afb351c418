use std::sync::Arc;

use mksearch_core::domain::engine_config::EngineConfig;
use mksearch_core::domain::index_model::IndexModel;
use mksearch_infra::search::{BackendConnector, ElasticSearchEngine};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine_config: Arc<EngineConfig>,
    pub connector: Arc<dyn BackendConnector>,
    pub index_model: IndexModel,
}

impl AppState {
    /// A fresh engine for one request. Only the connector's client pool and
    /// the immutable configuration are shared.
    pub fn engine(&self) -> ElasticSearchEngine {
        let mut engine =
            ElasticSearchEngine::new(self.connector.clone(), self.engine_config.clone());
        engine.set_index_model(self.index_model.clone());
        engine
    }
}
