use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::paging::PageState;
use crate::types::sort::SortSpec;

pub const OPTION_LIMIT: &str = "limit";
pub const OPTION_OFFSET: &str = "offset";
pub const OPTION_FROM: &str = "from";
pub const OPTION_SORT: &str = "sort";
pub const OPTION_DEBUG: &str = "debug";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFields {
    #[serde(default)]
    pub term: String,
    #[serde(default, rename = "facet", deserialize_with = "deserialize_facets")]
    pub facets: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

fn deserialize_facets<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(name, value)| (name, value.into())).collect())
}

impl SearchFields {
    pub fn with_term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            facets: BTreeMap::new(),
        }
    }

    pub fn add_facet(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.facets.entry(name.into()).or_default().push(value.into());
    }
}

/// Query shaping options. Recognized keys have typed accessors, everything
/// else is carried along for the backend transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchOptions(BTreeMap<String, Value>);

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    pub fn limit(&self) -> Option<u64> {
        self.get(OPTION_LIMIT)
            .and_then(value_as_u64)
            .filter(|limit| *limit > 0)
    }

    pub fn offset(&self) -> Option<u64> {
        self.get(OPTION_OFFSET)
            .or_else(|| self.get(OPTION_FROM))
            .and_then(value_as_u64)
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.get(OPTION_SORT)
            .and_then(Value::as_str)
            .and_then(SortSpec::parse)
    }

    pub fn debug(&self) -> bool {
        match self.get(OPTION_DEBUG) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_f64().is_some_and(|value| value != 0.0),
            Some(Value::String(text)) => matches!(text.trim(), "1" | "true" | "yes" | "on"),
            _ => false,
        }
    }

    /// Merges the page browser state back into the options, the way the
    /// second pass of a paged search expects it.
    pub fn apply_page(&mut self, page: &PageState) {
        self.insert(OPTION_OFFSET, page.offset);
        self.insert(OPTION_LIMIT, page.limit);
    }
}

impl From<BTreeMap<String, Value>> for SearchOptions {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// One matched document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub fields: Map<String, Value>,
}

impl Hit {
    pub fn from_source(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetBucket {
    pub key: String,
    pub doc_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetAggregation {
    pub buckets: Vec<FacetBucket>,
    pub sum_other_doc_count: u64,
}

pub type Aggregations = BTreeMap<String, FacetAggregation>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<Hit>,
    pub num_found: u64,
    pub search_time: String,
    pub query_time: String,
    pub aggregations: Aggregations,
    pub error: Option<Value>,
    pub search_url: String,
    pub search_query: String,
    pub search_data: String,
    pub search_fields: SearchFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}

impl SearchResult {
    pub fn empty(fields: SearchFields) -> Self {
        Self {
            search_fields: fields,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sort::SortOrder;

    #[test]
    fn facets_accept_scalar_and_list() {
        let fields: SearchFields = serde_json::from_value(serde_json::json!({
            "term": "news",
            "facet": {"category": "sport", "tags": ["a", "b"]}
        }))
        .unwrap();
        assert_eq!(fields.term, "news");
        assert_eq!(fields.facets["category"], vec!["sport"]);
        assert_eq!(fields.facets["tags"], vec!["a", "b"]);
    }

    #[test]
    fn fields_default_to_empty() {
        let fields: SearchFields = serde_json::from_str("{}").unwrap();
        assert!(fields.term.is_empty());
        assert!(fields.facets.is_empty());
    }

    #[test]
    fn add_facet_appends_values() {
        let mut fields = SearchFields::with_term("x");
        fields.add_facet("tags", "a");
        fields.add_facet("tags", "b");
        assert_eq!(fields.facets["tags"], vec!["a", "b"]);
    }

    #[test]
    fn options_typed_accessors() {
        let options = SearchOptions::new()
            .with("limit", "10")
            .with("from", 20)
            .with("sort", "title desc")
            .with("debug", 1);
        assert_eq!(options.limit(), Some(10));
        assert_eq!(options.offset(), Some(20));
        assert_eq!(options.sort().unwrap().order, SortOrder::Desc);
        assert!(options.debug());
    }

    #[test]
    fn zero_limit_is_unset() {
        let options = SearchOptions::new().with("limit", 0);
        assert_eq!(options.limit(), None);
    }

    #[test]
    fn offset_wins_over_from() {
        let options = SearchOptions::new().with("from", 5).with("offset", 15);
        assert_eq!(options.offset(), Some(15));
    }

    #[test]
    fn apply_page_overrides_offset_and_limit() {
        let mut options = SearchOptions::new().with("limit", 10).with("offset", 99);
        options.apply_page(&PageState {
            pointer: 2,
            offset: 20,
            limit: 10,
            out_of_range: false,
        });
        assert_eq!(options.offset(), Some(20));
        assert_eq!(options.limit(), Some(10));
    }

    #[test]
    fn hit_serializes_only_reported_attributes() {
        let mut source = Map::new();
        source.insert("title".to_string(), Value::from("Hello"));
        let mut hit = Hit::from_source(source);
        hit.id = Some("7".to_string());
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["id"], "7");
        assert!(json.get("score").is_none());
        assert_eq!(json["fields"]["title"], "Hello");
    }
}
