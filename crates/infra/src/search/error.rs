use mksearch_core::error::CoreError;
use thiserror::Error;

use crate::search::backend::{BackendError, RequestEcho};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid credentials: {0}")]
    Credentials(#[from] CoreError),
    #[error("ElasticSearch service not responding ({reason}). Credentials: {credentials}")]
    Connection { credentials: String, reason: String },
    #[error(
        "Error requesting ElasticSearch. HTTP status: {status}; Path: {}; Query: {}; Data: {}",
        .request.path,
        .request.query,
        .request.data
    )]
    BackendResponse { status: u16, request: RequestEcho },
    #[error("Exception caught from ElasticSearch: {0}")]
    Transport(String),
    #[error("no index is open and no index model is configured")]
    NoIndex,
    #[error("document {0} has no uid")]
    MissingUid(String),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
