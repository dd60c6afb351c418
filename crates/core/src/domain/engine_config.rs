use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_ACCESS_FIELD: &str = "fe_group_mi";
pub const DEFAULT_AGGREGATION_SUFFIX: &str = ".keyword";

/// Static engine configuration, loaded once per engine instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub allowed_search_fields: Vec<String>,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default = "default_access_field")]
    pub access_field: String,
    #[serde(default = "default_aggregation_suffix")]
    pub aggregation_suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterConfig {
    /// Boost weights in configuration order.
    #[serde(default, deserialize_with = "deserialize_boosts")]
    pub boost: Vec<(String, f64)>,
    #[serde(default)]
    pub facets: FacetsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FacetsConfig {
    #[serde(default)]
    pub fields: Vec<FacetField>,
    #[serde(default)]
    pub hit: FacetHitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacetField {
    pub name: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacetHitConfig {
    #[serde(default)]
    pub mapping: FacetHitMapping,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacetHitMapping {
    #[serde(default)]
    pub field: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_search_fields: Vec::new(),
            filter: FilterConfig::default(),
            access_field: default_access_field(),
            aggregation_suffix: default_aggregation_suffix(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn is_allowed_search_field(&self, field: &str) -> bool {
        self.allowed_search_fields.iter().any(|allowed| allowed == field)
    }

    /// Boost fields in `field^weight` form, or `None` when no boost is configured.
    pub fn boosted_fields(&self) -> Option<Vec<String>> {
        if self.filter.boost.is_empty() {
            return None;
        }
        Some(
            self.filter
                .boost
                .iter()
                .map(|(field, weight)| format!("{field}^{weight}"))
                .collect(),
        )
    }

    pub fn facet_field(&self, facet: &str) -> Option<&str> {
        self.filter
            .facets
            .hit
            .mapping
            .field
            .get(facet)
            .map(String::as_str)
    }
}

fn default_access_field() -> String {
    DEFAULT_ACCESS_FIELD.to_string()
}

fn default_aggregation_suffix() -> String {
    DEFAULT_AGGREGATION_SUFFIX.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldList {
    Joined(String),
    Items(Vec<String>),
}

fn deserialize_field_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match FieldList::deserialize(deserializer)? {
        FieldList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        FieldList::Items(items) => items,
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoostWeight {
    Number(f64),
    Text(String),
}

struct BoostVisitor;

impl<'de> Visitor<'de> for BoostVisitor {
    type Value = Vec<(String, f64)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to boost weights")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut boosts: Vec<(String, f64)> = Vec::new();
        while let Some((field, weight)) = map.next_entry::<String, BoostWeight>()? {
            let weight = match weight {
                BoostWeight::Number(weight) => weight,
                BoostWeight::Text(text) => text.trim().parse().map_err(|_| {
                    serde::de::Error::custom(format!("invalid boost for {field}: {text}"))
                })?,
            };
            // A repeated field keeps its first position and the last weight.
            match boosts.iter_mut().find(|(existing, _)| *existing == field) {
                Some(entry) => entry.1 = weight,
                None => boosts.push((field, weight)),
            }
        }
        Ok(boosts)
    }
}

fn deserialize_boosts<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(BoostVisitor)
}
