use std::collections::BTreeMap;

use mksearch_core::domain::search::{
    OPTION_DEBUG, OPTION_FROM, OPTION_LIMIT, OPTION_OFFSET, SearchOptions,
};
use serde::Serialize;
use serde_json::Value;

pub const OPTION_SEARCH_TYPE: &str = "search_type";
pub const OPTION_ROUTING: &str = "routing";
pub const OPTION_PREFERENCE: &str = "preference";
pub const OPTION_VERSION: &str = "version";
pub const OPTION_TIMEOUT: &str = "timeout";
pub const OPTION_SIZE: &str = "size";
pub const OPTION_SCROLL: &str = "scroll";
pub const OPTION_SCROLL_ID: &str = "scroll_id";
pub const OPTION_EXPLAIN: &str = "explain";

const ALLOWED_OPTIONS: [&str; 11] = [
    OPTION_SEARCH_TYPE,
    OPTION_ROUTING,
    OPTION_PREFERENCE,
    OPTION_VERSION,
    OPTION_TIMEOUT,
    OPTION_FROM,
    OPTION_SIZE,
    OPTION_LIMIT,
    OPTION_SCROLL,
    OPTION_SCROLL_ID,
    OPTION_EXPLAIN,
];

/// Transport options for one search request, restricted to what the
/// search endpoint understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BackendOptions(BTreeMap<String, Value>);

impl BackendOptions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    pub fn scroll_id(&self) -> Option<&str> {
        self.get(OPTION_SCROLL_ID).and_then(Value::as_str)
    }

    pub fn scroll(&self) -> Option<String> {
        self.get(OPTION_SCROLL).map(value_to_param)
    }

    /// URL parameters for the search endpoint. `limit` travels as `size`
    /// unless `size` was given explicitly; `scroll_id` belongs in the body.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != OPTION_SCROLL_ID)
            .filter(|(key, _)| key.as_str() != OPTION_LIMIT || !self.contains(OPTION_SIZE))
            .map(|(key, value)| {
                let key = if key == OPTION_LIMIT { OPTION_SIZE } else { key.as_str() };
                (key.to_string(), value_to_param(value))
            })
            .collect()
    }
}

fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn remap_key(key: &str) -> Option<&'static str> {
    match key {
        OPTION_DEBUG => Some(OPTION_EXPLAIN),
        OPTION_OFFSET => Some(OPTION_FROM),
        _ => None,
    }
}

/// Derives transport options from generic search options. `debug` becomes
/// `explain` and `offset` becomes `from`; the renamed keys take precedence
/// over their targets. Keys outside the allow-list are dropped.
pub fn remap_options(options: &SearchOptions) -> BackendOptions {
    let mut remapped = BTreeMap::new();
    for (key, value) in options.iter() {
        if remap_key(key).is_none() && ALLOWED_OPTIONS.contains(&key.as_str()) {
            remapped.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in options.iter() {
        if let Some(target) = remap_key(key) {
            remapped.insert(target.to_string(), value.clone());
        }
    }
    BackendOptions(remapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchOptions {
        SearchOptions::new()
            .with("debug", true)
            .with("offset", 20)
            .with("limit", 10)
            .with("routing", "user1")
            .with("sort", "title asc")
            .with("fancy", "ignored")
    }

    #[test]
    fn renames_and_filters() {
        let remapped = remap_options(&sample());
        assert_eq!(remapped.get("explain"), Some(&Value::Bool(true)));
        assert_eq!(remapped.get("from"), Some(&Value::from(20)));
        assert_eq!(remapped.get("limit"), Some(&Value::from(10)));
        assert_eq!(remapped.get("routing"), Some(&Value::from("user1")));
        assert!(!remapped.contains("debug"));
        assert!(!remapped.contains("offset"));
        assert!(!remapped.contains("sort"));
        assert!(!remapped.contains("fancy"));
        assert_eq!(remapped.len(), 4);
    }

    #[test]
    fn remap_is_idempotent() {
        let once = remap_options(&sample());
        let twice = remap_options(&SearchOptions::from(once.clone().into_inner()));
        assert_eq!(once, twice);
        assert!(!twice.contains("fancy"));
    }

    #[test]
    fn renamed_key_takes_precedence() {
        let options = SearchOptions::new()
            .with("offset", 30)
            .with("from", 10)
            .with("explain", false)
            .with("debug", true);
        let remapped = remap_options(&options);
        assert_eq!(remapped.get("from"), Some(&Value::from(30)));
        assert_eq!(remapped.get("explain"), Some(&Value::Bool(true)));
    }

    #[test]
    fn empty_options_stay_empty() {
        assert!(remap_options(&SearchOptions::new()).is_empty());
    }

    #[test]
    fn query_pairs_send_limit_as_size() {
        let remapped = remap_options(&sample());
        let pairs = remapped.query_pairs();
        assert!(pairs.contains(&("size".to_string(), "10".to_string())));
        assert!(pairs.contains(&("from".to_string(), "20".to_string())));
        assert!(pairs.contains(&("explain".to_string(), "true".to_string())));
        assert!(pairs.contains(&("routing".to_string(), "user1".to_string())));
        assert!(!pairs.iter().any(|(key, _)| key == "limit"));
    }

    #[test]
    fn explicit_size_beats_limit() {
        let options = SearchOptions::new().with("limit", 10).with("size", 5);
        let pairs = remap_options(&options).query_pairs();
        assert_eq!(pairs, vec![("size".to_string(), "5".to_string())]);
    }

    #[test]
    fn scroll_id_stays_out_of_url() {
        let options = SearchOptions::new()
            .with("scroll", "1m")
            .with("scroll_id", "abc");
        let remapped = remap_options(&options);
        assert_eq!(remapped.scroll_id(), Some("abc"));
        assert_eq!(remapped.scroll(), Some("1m".to_string()));
        assert_eq!(
            remapped.query_pairs(),
            vec![("scroll".to_string(), "1m".to_string())]
        );
    }
}
