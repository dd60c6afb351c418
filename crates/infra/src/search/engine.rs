use std::sync::Arc;
use std::time::Instant;

use mksearch_core::domain::document::IndexerDocument;
use mksearch_core::domain::engine_config::EngineConfig;
use mksearch_core::domain::index_model::IndexModel;
use mksearch_core::domain::search::{SearchFields, SearchOptions, SearchResult};
use mksearch_core::domain::status::EngineStatus;
use mksearch_core::types::credentials::Credentials;
use mksearch_core::types::visitor::VisitorContext;
use tracing::{debug, error, info, warn};

use crate::search::backend::{
    BackendConnector, BackendDocument, BackendError, DocumentRef, SearchBackend,
};
use crate::search::error::EngineError;
use crate::search::normalizer::normalize;
use crate::search::options::remap_options;
use crate::search::query_builder::build_query;

#[derive(Clone)]
struct OpenIndex {
    name: String,
    backend: Arc<dyn SearchBackend>,
}

/// Search engine facade over one Elasticsearch connection.
///
/// The engine is meant to live for one logical request. It opens lazily from
/// the configured [`IndexModel`] the first time an operation needs the index.
pub struct ElasticSearchEngine {
    connector: Arc<dyn BackendConnector>,
    config: Arc<EngineConfig>,
    index_model: Option<IndexModel>,
    credentials: String,
    open: Option<OpenIndex>,
}

impl ElasticSearchEngine {
    pub fn new(connector: Arc<dyn BackendConnector>, config: Arc<EngineConfig>) -> Self {
        Self {
            connector,
            config,
            index_model: None,
            credentials: String::new(),
            open: None,
        }
    }

    pub fn set_index_model(&mut self, model: IndexModel) {
        self.index_model = Some(model);
    }

    pub fn open_index_name(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.name.as_str())
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Connects to the servers of `model`, creates the index when it does not
    /// exist yet, opens it and probes the cluster. A previously open index is
    /// replaced without being closed.
    pub async fn open_index(
        &mut self,
        model: &IndexModel,
        force_creation: bool,
    ) -> Result<(), EngineError> {
        let credentials = Credentials::parse(&model.credentials)?;
        let raw = credentials.as_str().to_string();
        self.index_model = Some(model.clone());
        self.credentials = raw.clone();

        let name = credentials.index_name().to_string();
        debug!(index = %name, force_creation, "opening index");

        let backend = self
            .connector
            .connect(&credentials)
            .map_err(|err| connection_error(&raw, err))?;
        prepare_index(backend.as_ref(), &name)
            .await
            .map_err(|err| connection_error(&raw, err))?;

        let probe = backend
            .status()
            .await
            .map_err(|err| connection_error(&raw, err))?;
        if !probe.is_ok() {
            error!(credentials = %raw, status = probe.status, "elasticsearch not responding");
            return Err(EngineError::Connection {
                credentials: raw,
                reason: format!("HTTP status {}", probe.status),
            });
        }

        info!(index = %name, title = %model.title, "index opened");
        self.open = Some(OpenIndex { name, backend });
        Ok(())
    }

    pub async fn index_exists(&mut self, name: &str) -> Result<bool, EngineError> {
        let open = self.ensure_open().await?;
        Ok(open.backend.index_exists(name).await?)
    }

    pub fn make_index_doc_instance(&self, ext_key: &str, content_type: &str) -> IndexerDocument {
        IndexerDocument::new(ext_key, content_type)
    }

    pub async fn search(
        &mut self,
        fields: &SearchFields,
        options: &SearchOptions,
        visitor: &VisitorContext,
    ) -> Result<SearchResult, EngineError> {
        let open = self.ensure_open().await?;
        debug!(
            index = %open.name,
            term = %fields.term,
            offset = ?options.offset(),
            limit = ?options.limit(),
            "searching"
        );
        let query = build_query(fields, options, &self.config, visitor);
        let backend_options = remap_options(options);

        let started = Instant::now();
        let exchange = open
            .backend
            .search(&open.name, &query, &backend_options)
            .await
            .map_err(transport_error)?;
        let result = normalize(exchange, started.elapsed(), fields)?;

        if options.debug() {
            debug!(options = ?options, result = ?result, "search debug");
        }
        Ok(result)
    }

    pub async fn index_new(&mut self, doc: &IndexerDocument) -> Result<bool, EngineError> {
        let open = self.ensure_open().await?;
        let doc_type = doc.document_type();
        let id = doc
            .uid()
            .ok_or_else(|| EngineError::MissingUid(doc_type.clone()))?;
        let document = BackendDocument {
            id,
            doc_type,
            source: doc.to_source(),
        };
        let indexed = open
            .backend
            .add_documents(&open.name, &[document])
            .await
            .map_err(transport_error)?;
        if !indexed {
            warn!(
                index = %open.name,
                ext_key = %doc.ext_key(),
                content_type = %doc.content_type(),
                "bulk index reported errors"
            );
        }
        Ok(indexed)
    }

    /// Elasticsearch decides on its own whether a write is an insert or an
    /// update.
    pub async fn index_update(&mut self, doc: &IndexerDocument) -> Result<bool, EngineError> {
        self.index_new(doc).await
    }

    pub async fn index_delete_by_content_uid(
        &mut self,
        uid: &str,
        ext_key: &str,
        content_type: &str,
    ) -> Result<bool, EngineError> {
        let open = self.ensure_open().await?;
        let document = DocumentRef {
            id: uid.to_string(),
            doc_type: mksearch_core::domain::document::document_type(ext_key, content_type),
        };
        open.backend
            .delete_documents(&open.name, &[document])
            .await
            .map_err(transport_error)
    }

    pub async fn close_index(&mut self) -> Result<(), EngineError> {
        let open = self.ensure_open().await?;
        open.backend.close_index(&open.name).await?;
        self.open = None;
        info!(index = %open.name, "index closed");
        Ok(())
    }

    /// Deletes `name`, or the open index when no name is given.
    pub async fn delete_index(&mut self, name: Option<&str>) -> Result<(), EngineError> {
        let open = self.ensure_open().await?;
        let target = name.unwrap_or(open.name.as_str());
        open.backend.delete_index(target).await?;
        warn!(index = %target, "index deleted");
        if target == open.name {
            self.open = None;
        }
        Ok(())
    }

    pub async fn optimize_index(&mut self) -> Result<(), EngineError> {
        let open = self.ensure_open().await?;
        open.backend.optimize_index(&open.name).await?;
        info!(index = %open.name, "index optimized");
        Ok(())
    }

    // Writes are applied immediately, so there is nothing to commit.
    pub fn commit_index(&self) -> Result<(), EngineError> {
        debug!("commit_index is a no-op");
        Ok(())
    }

    pub fn replace_index(&self, which: &str, by: &str) -> Result<(), EngineError> {
        debug!(which, by, "replace_index is a no-op");
        Ok(())
    }

    pub fn index_delete_by_index_id(&self, id: &str) -> Result<(), EngineError> {
        debug!(id, "index_delete_by_index_id is a no-op");
        Ok(())
    }

    pub fn index_delete_by_query(&self, query: &str) -> Result<(), EngineError> {
        debug!(query, "index_delete_by_query is a no-op");
        Ok(())
    }

    /// Health of the cluster behind the configured credentials. Never fails.
    pub async fn get_status(&mut self) -> EngineStatus {
        let probe = match self.ensure_open().await {
            Ok(open) => open.backend.status().await.map_err(EngineError::from),
            Err(err) => Err(err),
        };
        match probe {
            Ok(response) if response.is_ok() => EngineStatus::Up {
                ping_ms: response.elapsed.as_micros() as f64 / 1000.0,
            },
            Ok(_) => EngineStatus::Down,
            Err(err) => EngineStatus::Unavailable {
                reason: format!(
                    "Error connecting ElasticSearch: {err}. Credentials: {}",
                    self.credentials
                ),
            },
        }
    }

    async fn ensure_open(&mut self) -> Result<OpenIndex, EngineError> {
        if let Some(open) = &self.open {
            return Ok(open.clone());
        }
        let model = self.index_model.clone().ok_or(EngineError::NoIndex)?;
        self.open_index(&model, false).await?;
        self.open.clone().ok_or(EngineError::NoIndex)
    }
}

async fn prepare_index(backend: &dyn SearchBackend, name: &str) -> Result<(), BackendError> {
    if !backend.index_exists(name).await? {
        info!(index = %name, "creating missing index");
        backend.create_index(name).await?;
    }
    backend.open_index(name).await
}

fn connection_error(credentials: &str, err: BackendError) -> EngineError {
    error!(credentials = %credentials, error = %err, "elasticsearch not responding");
    EngineError::Connection {
        credentials: credentials.to_string(),
        reason: err.to_string(),
    }
}

fn transport_error(err: BackendError) -> EngineError {
    EngineError::Transport(err.to_string())
}
