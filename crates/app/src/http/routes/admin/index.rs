use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::http::{engine_error_status, ErrorBody};
use crate::state::AppState;
use mksearch_infra::search::EngineError;

#[derive(Debug, Error)]
pub enum IndexAdminError {
    #[error("{0}")]
    Engine(#[from] EngineError),
}

#[derive(Debug, Serialize)]
pub struct IndexActionResponse {
    action: &'static str,
    index: String,
}

pub async fn post_optimize(
    State(state): State<AppState>,
) -> Result<Json<IndexActionResponse>, IndexAdminError> {
    let mut engine = state.engine();
    engine.optimize_index().await?;
    engine.commit_index()?;
    Ok(Json(IndexActionResponse {
        action: "optimize",
        index: engine.open_index_name().unwrap_or_default().to_string(),
    }))
}

impl IntoResponse for IndexAdminError {
    fn into_response(self) -> Response {
        let IndexAdminError::Engine(err) = &self;
        error!(error = %err, "index maintenance failed");
        let status = engine_error_status(err);
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
