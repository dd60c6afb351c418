use mksearch_core::domain::paging::PageState;
use mksearch_core::domain::search::{SearchFields, SearchOptions, SearchResult};
use mksearch_core::types::visitor::VisitorContext;
use serde::Serialize;
use tracing::debug;

use crate::search::engine::ElasticSearchEngine;
use crate::search::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedSearch {
    #[serde(flatten)]
    pub result: SearchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageState>,
}

/// Runs a search twice: the first pass only yields the total hit count that
/// the page browser needs to correct the offset, the second pass fetches the
/// requested page. Without a `limit` there is no page browser and the second
/// pass repeats the first one.
pub async fn two_pass_search(
    engine: &mut ElasticSearchEngine,
    fields: &SearchFields,
    options: &SearchOptions,
    visitor: &VisitorContext,
    pointer: u64,
) -> Result<PagedSearch, EngineError> {
    let first = engine.search(fields, options, visitor).await?;

    let mut options = options.clone();
    let page = options.limit().map(|limit| {
        let page = PageState::compute(pointer, first.num_found, limit);
        options.apply_page(&page);
        page
    });
    if let Some(page) = &page {
        debug!(
            pointer = page.pointer,
            offset = page.offset,
            limit = page.limit,
            out_of_range = page.out_of_range,
            total = first.num_found,
            "page browser state"
        );
    }

    let result = engine.search(fields, &options, visitor).await?;
    Ok(PagedSearch { result, page })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::search::testing::{BackendCall, MockBackend, MockConnector};
    use mksearch_core::domain::engine_config::EngineConfig;
    use mksearch_core::domain::index_model::IndexModel;
    use serde_json::{json, Value};

    fn setup(total: u64) -> (ElasticSearchEngine, Arc<MockBackend>) {
        let backend = MockBackend::with_hits(total, json!([]));
        let mut engine = ElasticSearchEngine::new(
            MockConnector::new(backend.clone()),
            Arc::new(EngineConfig::default()),
        );
        engine.set_index_model(IndexModel::new("Main", "typo3;localhost,9200"));
        (engine, backend)
    }

    fn option(call: &BackendCall, key: &str) -> Option<Value> {
        match call {
            BackendCall::Search { options, .. } => options.get(key).cloned(),
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_pass_uses_corrected_offset() {
        let (mut engine, backend) = setup(35);
        let fields = SearchFields::with_term("news");
        let options = SearchOptions::new().with("limit", 10);

        let paged = two_pass_search(
            &mut engine,
            &fields,
            &options,
            &VisitorContext::anonymous(),
            2,
        )
        .await
        .unwrap();

        let page = paged.page.unwrap();
        assert_eq!(page.offset, 20);
        assert!(!page.out_of_range);
        assert_eq!(paged.result.search_fields, fields);

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(option(&calls[0], "from"), None);
        assert_eq!(option(&calls[1], "from"), Some(json!(20)));
        assert_eq!(option(&calls[1], "limit"), Some(json!(10)));
    }

    #[tokio::test]
    async fn pointer_past_the_end_is_clamped() {
        let (mut engine, backend) = setup(15);
        let options = SearchOptions::new().with("limit", 10).with("offset", 500);
        let paged = two_pass_search(
            &mut engine,
            &SearchFields::with_term("x"),
            &options,
            &VisitorContext::anonymous(),
            9,
        )
        .await
        .unwrap();

        let page = paged.page.unwrap();
        assert!(page.out_of_range);
        assert_eq!(page.pointer, 1);
        assert_eq!(option(&backend.search_calls()[1], "from"), Some(json!(10)));
    }

    #[tokio::test]
    async fn no_hits_yields_zero_offset() {
        let (mut engine, backend) = setup(0);
        let options = SearchOptions::new().with("limit", 10);
        let paged = two_pass_search(
            &mut engine,
            &SearchFields::with_term("x"),
            &options,
            &VisitorContext::anonymous(),
            3,
        )
        .await
        .unwrap();
        assert_eq!(paged.page.unwrap().offset, 0);
        assert_eq!(option(&backend.search_calls()[1], "from"), Some(json!(0)));
    }

    #[tokio::test]
    async fn without_limit_second_pass_repeats_options() {
        let (mut engine, backend) = setup(40);
        let options = SearchOptions::new().with("sort", "title asc");
        let paged = two_pass_search(
            &mut engine,
            &SearchFields::with_term("x"),
            &options,
            &VisitorContext::anonymous(),
            1,
        )
        .await
        .unwrap();
        assert_eq!(paged.page, None);

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn serializes_result_flat_with_page() {
        let (mut engine, _) = setup(5);
        let paged = two_pass_search(
            &mut engine,
            &SearchFields::with_term("x"),
            &SearchOptions::new().with("limit", 2),
            &VisitorContext::anonymous(),
            0,
        )
        .await
        .unwrap();
        let json = serde_json::to_value(&paged).unwrap();
        assert_eq!(json["numFound"], 5);
        assert_eq!(json["page"]["limit"], 2);
        assert_eq!(json["page"]["outOfRange"], false);
    }
}
