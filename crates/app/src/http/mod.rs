pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use axum::http::StatusCode;
use mksearch_infra::search::EngineError;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), HttpError> {
    let router = router::build(state);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Response status for an engine failure.
pub fn engine_error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Connection { .. } | EngineError::NoIndex => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::BackendResponse { .. }
        | EngineError::Transport(_)
        | EngineError::Backend(_) => StatusCode::BAD_GATEWAY,
        EngineError::MissingUid(_) => StatusCode::BAD_REQUEST,
        EngineError::Credentials(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
