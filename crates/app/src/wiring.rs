use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::AppConfig;
use crate::state::AppState;
use mksearch_core::domain::index_model::IndexModel;
use mksearch_infra::search::HttpConnector;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let client = Client::builder().timeout(config.request_timeout).build()?;
    let index_model = IndexModel::new(
        config.credentials.index_name(),
        config.credentials.as_str(),
    );
    let engine_config = Arc::new(config.engine_config.clone());
    Ok(AppState {
        config: Arc::new(config),
        engine_config,
        connector: Arc::new(HttpConnector::new(client)),
        index_model,
    })
}
