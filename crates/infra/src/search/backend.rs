use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mksearch_core::types::credentials::Credentials;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::search::options::BackendOptions;
use crate::search::query_builder::BackendQuery;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no reachable server: {0}")]
    Unreachable(String),
    #[error("unexpected status {status} for {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },
}

/// The request as it went over the wire, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestEcho {
    pub path: String,
    pub query: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Value,
    pub elapsed: Duration,
}

impl BackendResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchExchange {
    pub request: RequestEcho,
    pub response: BackendResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendDocument {
    pub id: String,
    pub doc_type: String,
    pub source: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: String,
    pub doc_type: String,
}

/// Boundary to the search server. One instance is bound to the server list
/// of one credential string.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        index: &str,
        query: &BackendQuery,
        options: &BackendOptions,
    ) -> Result<SearchExchange, BackendError>;

    async fn add_documents(
        &self,
        index: &str,
        documents: &[BackendDocument],
    ) -> Result<bool, BackendError>;

    async fn delete_documents(
        &self,
        index: &str,
        documents: &[DocumentRef],
    ) -> Result<bool, BackendError>;

    async fn status(&self) -> Result<BackendResponse, BackendError>;

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError>;

    async fn create_index(&self, index: &str) -> Result<(), BackendError>;

    async fn open_index(&self, index: &str) -> Result<(), BackendError>;

    async fn close_index(&self, index: &str) -> Result<(), BackendError>;

    async fn delete_index(&self, index: &str) -> Result<(), BackendError>;

    async fn optimize_index(&self, index: &str) -> Result<(), BackendError>;
}

/// Builds a backend for a parsed credential string.
pub trait BackendConnector: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn SearchBackend>, BackendError>;
}
