pub mod backend;
pub mod engine;
pub mod error;
pub mod http_backend;
pub mod normalizer;
pub mod options;
pub mod paging;
pub mod query_builder;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    BackendConnector, BackendDocument, BackendError, BackendResponse, DocumentRef, RequestEcho,
    SearchBackend, SearchExchange,
};
pub use engine::ElasticSearchEngine;
pub use error::EngineError;
pub use http_backend::{ElasticHttpBackend, HttpConnector};
pub use normalizer::normalize;
pub use options::{remap_options, BackendOptions};
pub use paging::{two_pass_search, PagedSearch};
pub use query_builder::{build_query, BackendQuery};
