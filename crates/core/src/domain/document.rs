use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub const PRIMARY_KEY_UID: &str = "uid";
pub const PRIMARY_KEY_EXT_KEY: &str = "extKey";
pub const PRIMARY_KEY_CONTENT_TYPE: &str = "contentType";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Bytes(bytes) => bytes.is_empty(),
            _ => false,
        }
    }

    /// Wire representation; byte values are normalized to UTF-8.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Bytes(bytes) => Value::String(utf8_encode(bytes)),
            FieldValue::Integer(value) => Value::from(*value),
            FieldValue::Float(value) => Value::from(*value),
            FieldValue::Bool(value) => Value::Bool(*value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Decodes bytes as UTF-8, falling back to ISO-8859-1 for legacy content.
pub fn utf8_encode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|byte| char::from(*byte)).collect(),
    }
}

/// A record prepared for indexing. Identity is `uid` within the
/// `extKey:contentType` category.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexerDocument {
    ext_key: String,
    content_type: String,
    uid: Option<FieldValue>,
    data: BTreeMap<String, FieldValue>,
}

impl IndexerDocument {
    pub fn new(ext_key: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            ext_key: ext_key.into(),
            content_type: content_type.into(),
            uid: None,
            data: BTreeMap::new(),
        }
    }

    pub fn set_uid(&mut self, uid: impl Into<FieldValue>) {
        self.uid = Some(uid.into());
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.data.insert(name.into(), value.into());
    }

    pub fn ext_key(&self) -> &str {
        &self.ext_key
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn uid(&self) -> Option<String> {
        self.uid.as_ref().map(|uid| match uid.to_json() {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    pub fn document_type(&self) -> String {
        document_type(&self.ext_key, &self.content_type)
    }

    /// Flattens primary key and data into the transmitted source document.
    /// Empty text values are left out.
    pub fn to_source(&self) -> Map<String, Value> {
        let mut source = Map::new();
        let primary_key = [
            (PRIMARY_KEY_UID, self.uid.clone()),
            (PRIMARY_KEY_EXT_KEY, Some(FieldValue::Text(self.ext_key.clone()))),
            (
                PRIMARY_KEY_CONTENT_TYPE,
                Some(FieldValue::Text(self.content_type.clone())),
            ),
        ];
        for (key, value) in primary_key {
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                source.insert(key.to_string(), value.to_json());
            }
        }
        for (key, value) in &self.data {
            if !value.is_empty() {
                source.insert(key.clone(), value.to_json());
            }
        }
        source
    }
}

pub fn document_type(ext_key: &str, content_type: &str) -> String {
    format!("{ext_key}:{content_type}")
}
