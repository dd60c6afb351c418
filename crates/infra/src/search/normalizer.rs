use std::time::Duration;

use mksearch_core::domain::search::{
    Aggregations, FacetAggregation, FacetBucket, Hit, SearchFields, SearchResult,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::search::backend::SearchExchange;
use crate::search::error::EngineError;

#[derive(Debug, Deserialize)]
struct RawSearchBody {
    took: Option<u64>,
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    #[serde(default)]
    hits: RawHits,
    #[serde(default)]
    aggregations: Map<String, Value>,
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHits {
    total: Option<RawTotal>,
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTotal {
    Count(u64),
    Object { value: u64 },
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_index")]
    index: Option<String>,
    #[serde(rename = "_type")]
    doc_type: Option<String>,
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAggregation {
    #[serde(default)]
    buckets: Vec<RawBucket>,
    #[serde(default)]
    sum_other_doc_count: u64,
}

#[derive(Debug, Deserialize)]
struct RawBucket {
    key: Value,
    key_as_string: Option<String>,
    #[serde(default)]
    doc_count: u64,
}

/// Turns a backend search exchange into the uniform result shape. A status
/// other than 200 fails the whole search.
pub fn normalize(
    exchange: SearchExchange,
    elapsed: Duration,
    fields: &SearchFields,
) -> Result<SearchResult, EngineError> {
    let SearchExchange { request, response } = exchange;
    if !response.is_ok() {
        return Err(EngineError::BackendResponse {
            status: response.status,
            request,
        });
    }

    let body: RawSearchBody = serde_json::from_value(response.body)
        .map_err(|err| EngineError::Transport(format!("invalid search response: {err}")))?;

    let num_found = match body.hits.total {
        Some(RawTotal::Count(total)) | Some(RawTotal::Object { value: total }) => total,
        None => 0,
    };
    let items = body.hits.hits.into_iter().map(hit_from_raw).collect();

    Ok(SearchResult {
        items,
        num_found,
        search_time: format_millis(elapsed.as_micros() as f64 / 1000.0),
        query_time: format_millis(body.took.unwrap_or_default() as f64),
        aggregations: aggregations_from_raw(body.aggregations),
        error: body.error,
        search_url: request.path,
        search_query: request.query,
        search_data: request.data,
        search_fields: fields.clone(),
        scroll_id: body.scroll_id,
    })
}

fn hit_from_raw(raw: RawHit) -> Hit {
    Hit {
        index: raw.index,
        content_type: raw.doc_type,
        id: raw.id,
        score: raw.score,
        fields: raw.source,
    }
}

fn aggregations_from_raw(raw: Map<String, Value>) -> Aggregations {
    raw.into_iter()
        .map(|(name, value)| {
            let parsed: RawAggregation = serde_json::from_value(value).unwrap_or_default();
            let aggregation = FacetAggregation {
                buckets: parsed.buckets.into_iter().map(bucket_from_raw).collect(),
                sum_other_doc_count: parsed.sum_other_doc_count,
            };
            (name, aggregation)
        })
        .collect()
}

fn bucket_from_raw(raw: RawBucket) -> FacetBucket {
    let key = match (raw.key_as_string, raw.key) {
        (Some(key), _) => key,
        (None, Value::String(key)) => key,
        (None, other) => other.to_string(),
    };
    FacetBucket {
        key,
        doc_count: raw.doc_count,
    }
}

fn format_millis(millis: f64) -> String {
    format!("{millis} ms")
}
