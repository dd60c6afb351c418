use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error};

use crate::http::{engine_error_status, ErrorBody};
use crate::state::AppState;
use mksearch_core::domain::search::{
    SearchFields, SearchOptions, SearchResult, OPTION_DEBUG, OPTION_LIMIT, OPTION_SORT,
};
use mksearch_core::types::visitor::VisitorContext;
use mksearch_infra::search::{two_pass_search, EngineError, PagedSearch};

const MAX_TERM_LEN: usize = 256;
pub const VISITOR_GROUPS_HEADER: &str = "x-visitor-groups";

#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("invalid value for {name}: {value}")]
    InvalidParam { name: &'static str, value: String },
    #[error("search term too long (max {0} chars)")]
    TermTooLong(usize),
    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// A search action request decoded from the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub fields: SearchFields,
    pub options: SearchOptions,
    pub pointer: u64,
}

pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, SearchApiError> {
    let request = parse_search_request(
        &params,
        state.config.default_limit,
        state.config.max_search_limit,
    )?;
    if state.config.nosearch {
        debug!("search disabled, returning empty result");
        let empty = PagedSearch {
            result: SearchResult::empty(request.fields),
            page: None,
        };
        return Ok(Json(empty).into_response());
    }

    let visitor = visitor_from_headers(&headers);
    let mut engine = state.engine();
    let paged = two_pass_search(
        &mut engine,
        &request.fields,
        &request.options,
        &visitor,
        request.pointer,
    )
    .await?;

    let status = if paged.page.is_some_and(|page| page.out_of_range) {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    Ok((status, Json(paged)).into_response())
}

pub fn parse_search_request(
    params: &[(String, String)],
    default_limit: u64,
    max_limit: u64,
) -> Result<SearchRequest, SearchApiError> {
    let mut fields = SearchFields::default();
    let mut options = SearchOptions::new();
    let mut limit = default_limit;
    let mut pointer = 0;

    for (key, value) in params {
        let value = value.trim();
        match key.as_str() {
            "term" => {
                enforce_term_length(value)?;
                fields.term = value.to_string();
            }
            "sort" => options.insert(OPTION_SORT, value),
            "debug" => options.insert(OPTION_DEBUG, value),
            "limit" => limit = parse_number("limit", value)?,
            // Backend page size; kept under the same cap as `limit`.
            "size" => limit = parse_number("size", value)?,
            "page" => pointer = parse_number("page", value)?,
            other => match facet_name(other) {
                Some(name) if !value.is_empty() => fields.add_facet(name, value),
                Some(_) => {}
                None => options.insert(other, value),
            },
        }
    }
    options.insert(OPTION_LIMIT, limit.min(max_limit).max(1));

    Ok(SearchRequest {
        fields,
        options,
        pointer,
    })
}

pub fn visitor_from_headers(headers: &HeaderMap) -> VisitorContext {
    headers
        .get(VISITOR_GROUPS_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(VisitorContext::from_group_list)
        .unwrap_or_else(VisitorContext::anonymous)
}

/// `facet[name]` and `facet[name][]` select values of the facet `name`.
fn facet_name(key: &str) -> Option<&str> {
    let inner = key.strip_prefix("facet[")?;
    let inner = inner.strip_suffix("[]").unwrap_or(inner);
    let name = inner.strip_suffix(']')?;
    (!name.is_empty()).then_some(name)
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, SearchApiError> {
    value.parse().map_err(|_| SearchApiError::InvalidParam {
        name,
        value: value.to_string(),
    })
}

fn enforce_term_length(term: &str) -> Result<(), SearchApiError> {
    if term.chars().count() > MAX_TERM_LEN {
        return Err(SearchApiError::TermTooLong(MAX_TERM_LEN));
    }
    Ok(())
}

impl IntoResponse for SearchApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchApiError::InvalidParam { .. } | SearchApiError::TermTooLong(_) => {
                StatusCode::BAD_REQUEST
            }
            SearchApiError::Engine(err) => {
                error!(error = %err, "search failed");
                engine_error_status(err)
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
