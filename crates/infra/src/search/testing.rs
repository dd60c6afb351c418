use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mksearch_core::types::credentials::Credentials;
use serde_json::{json, Value};

use crate::search::backend::{
    BackendConnector, BackendDocument, BackendError, BackendResponse, DocumentRef, RequestEcho,
    SearchBackend, SearchExchange,
};
use crate::search::options::BackendOptions;
use crate::search::query_builder::BackendQuery;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Search {
        index: String,
        query: Value,
        options: BackendOptions,
    },
    AddDocuments {
        index: String,
        documents: Vec<BackendDocument>,
    },
    DeleteDocuments {
        index: String,
        documents: Vec<DocumentRef>,
    },
    Status,
    IndexExists(String),
    CreateIndex(String),
    OpenIndex(String),
    CloseIndex(String),
    DeleteIndex(String),
    OptimizeIndex(String),
}

#[derive(Debug)]
pub struct MockState {
    pub calls: Vec<BackendCall>,
    pub search_status: u16,
    pub search_body: Value,
    pub status_code: u16,
    pub index_exists: bool,
    pub unreachable: bool,
}

/// In-memory backend recording every call.
#[derive(Debug)]
pub struct MockBackend {
    pub state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                search_status: 200,
                search_body: json!({"took": 3, "hits": {"total": 0, "hits": []}}),
                status_code: 200,
                index_exists: true,
                unreachable: false,
            }),
        })
    }

    pub fn with_hits(total: u64, hits: Value) -> Arc<Self> {
        let backend = Self::new();
        backend.state.lock().unwrap().search_body =
            json!({"took": 3, "hits": {"total": total, "hits": hits}});
        backend
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn search_calls(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Search { .. }))
            .collect()
    }

    fn record(&self, call: BackendCall) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.unreachable {
            return Err(BackendError::Unreachable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(
        &self,
        index: &str,
        query: &BackendQuery,
        options: &BackendOptions,
    ) -> Result<SearchExchange, BackendError> {
        self.record(BackendCall::Search {
            index: index.to_string(),
            query: query.as_json().clone(),
            options: options.clone(),
        })?;
        let state = self.state.lock().unwrap();
        Ok(SearchExchange {
            request: RequestEcho {
                path: format!("{index}/_search"),
                query: String::new(),
                data: query.to_string(),
            },
            response: BackendResponse {
                status: state.search_status,
                body: state.search_body.clone(),
                elapsed: Duration::from_millis(2),
            },
        })
    }

    async fn add_documents(
        &self,
        index: &str,
        documents: &[BackendDocument],
    ) -> Result<bool, BackendError> {
        self.record(BackendCall::AddDocuments {
            index: index.to_string(),
            documents: documents.to_vec(),
        })?;
        Ok(true)
    }

    async fn delete_documents(
        &self,
        index: &str,
        documents: &[DocumentRef],
    ) -> Result<bool, BackendError> {
        self.record(BackendCall::DeleteDocuments {
            index: index.to_string(),
            documents: documents.to_vec(),
        })?;
        Ok(true)
    }

    async fn status(&self) -> Result<BackendResponse, BackendError> {
        self.record(BackendCall::Status)?;
        Ok(BackendResponse {
            status: self.state.lock().unwrap().status_code,
            body: json!({}),
            elapsed: Duration::from_millis(5),
        })
    }

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        self.record(BackendCall::IndexExists(index.to_string()))?;
        Ok(self.state.lock().unwrap().index_exists)
    }

    async fn create_index(&self, index: &str) -> Result<(), BackendError> {
        self.record(BackendCall::CreateIndex(index.to_string()))
    }

    async fn open_index(&self, index: &str) -> Result<(), BackendError> {
        self.record(BackendCall::OpenIndex(index.to_string()))
    }

    async fn close_index(&self, index: &str) -> Result<(), BackendError> {
        self.record(BackendCall::CloseIndex(index.to_string()))
    }

    async fn delete_index(&self, index: &str) -> Result<(), BackendError> {
        self.record(BackendCall::DeleteIndex(index.to_string()))
    }

    async fn optimize_index(&self, index: &str) -> Result<(), BackendError> {
        self.record(BackendCall::OptimizeIndex(index.to_string()))
    }
}

/// Hands out the same mock backend for every connect.
pub struct MockConnector {
    pub backend: Arc<MockBackend>,
    pub connected: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new(backend: Arc<MockBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            connected: Mutex::new(Vec::new()),
        })
    }

    pub fn connect_count(&self) -> usize {
        self.connected.lock().unwrap().len()
    }
}

impl BackendConnector for MockConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn SearchBackend>, BackendError> {
        self.connected
            .lock()
            .unwrap()
            .push(credentials.as_str().to_string());
        let backend: Arc<dyn SearchBackend> = self.backend.clone();
        Ok(backend)
    }
}
