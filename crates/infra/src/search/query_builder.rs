use std::fmt;

use mksearch_core::domain::engine_config::EngineConfig;
use mksearch_core::domain::search::{SearchFields, SearchOptions};
use mksearch_core::types::visitor::VisitorContext;
use serde_json::{json, Map, Value};

pub const ALL_FIELDS: &str = "_all";

/// Request body for the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQuery(Value);

impl BackendQuery {
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for BackendQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn build_query(
    fields: &SearchFields,
    options: &SearchOptions,
    config: &EngineConfig,
    visitor: &VisitorContext,
) -> BackendQuery {
    let must = json!({
        "multi_match": {
            "query": query_term(&fields.term),
            "fields": search_fields(&fields.term, config),
            "operator": "and",
        }
    });

    let mut filters = vec![access_filter(config, visitor)];
    filters.extend(facet_filters(fields, config));

    let mut body = json!({
        "query": {
            "bool": {
                "must": [must],
                "filter": [{"bool": {"must": filters}}],
            }
        }
    });

    if let Some(sort) = sort_argument(options) {
        body["sort"] = sort;
    }
    if let Some(aggs) = aggregations(config) {
        body["aggs"] = aggs;
    }

    BackendQuery(body)
}

/// The effective search term: with a `:` present only the part after the
/// last colon is searched for, so `a:b:c` searches `c`.
pub fn query_term(term: &str) -> &str {
    if !term.contains(':') {
        return term;
    }
    term.rsplit(':').next().unwrap_or(term).trim()
}

/// Fields the full-text clause runs against. A `field:value` term pins the
/// search to `field` when it is allowed; otherwise the boost fields or all
/// fields are used.
pub fn search_fields(term: &str, config: &EngineConfig) -> Vec<String> {
    if !config.allowed_search_fields.is_empty() && term.contains(':') {
        let requested = term.split(':').next().unwrap_or_default().trim();
        if config.is_allowed_search_field(requested) {
            return vec![requested.to_string()];
        }
    }
    config
        .boosted_fields()
        .unwrap_or_else(|| vec![ALL_FIELDS.to_string()])
}

fn access_filter(config: &EngineConfig, visitor: &VisitorContext) -> Value {
    json!({
        "match": {
            config.access_field.as_str(): visitor.access_terms(),
        }
    })
}

fn facet_filters(fields: &SearchFields, config: &EngineConfig) -> Vec<Value> {
    let mut filters = Vec::new();
    for (facet, values) in &fields.facets {
        let Some(field) = config.facet_field(facet) else {
            continue;
        };
        for value in values {
            filters.push(json!({"match": {field: value}}));
        }
    }
    filters
}

fn aggregations(config: &EngineConfig) -> Option<Value> {
    let facets = &config.filter.facets.fields;
    if facets.is_empty() {
        return None;
    }
    let mut aggs = Map::new();
    for facet in facets {
        aggs.insert(
            facet.name.clone(),
            json!({
                "terms": {"field": format!("{}{}", facet.field, config.aggregation_suffix)}
            }),
        );
    }
    Some(Value::Object(aggs))
}

fn sort_argument(options: &SearchOptions) -> Option<Value> {
    let sort = options.sort()?;
    Some(json!([{ sort.field.as_str(): {"order": sort.order.as_str()} }]))
}
