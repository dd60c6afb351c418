use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::http::{engine_error_status, ErrorBody};
use crate::state::AppState;
use mksearch_core::domain::document::{FieldValue, IndexerDocument};
use mksearch_infra::search::{ElasticSearchEngine, EngineError};

#[derive(Debug, Error)]
pub enum DocumentApiError {
    #[error("uid must be a string or an integer")]
    InvalidUid,
    #[error("unsupported value for field {0}")]
    InvalidField(String),
    #[error("{0}")]
    Engine(#[from] EngineError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub ext_key: String,
    pub content_type: String,
    pub uid: Value,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct DocumentWriteResponse {
    pub action: &'static str,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub uid: String,
    pub ok: bool,
}

pub async fn post_document(
    State(state): State<AppState>,
    Json(payload): Json<DocumentPayload>,
) -> Result<Json<DocumentWriteResponse>, DocumentApiError> {
    let mut engine = state.engine();
    let document = build_document(&engine, &payload)?;
    let ok = engine.index_update(&document).await?;
    info!(
        ext_key = %document.ext_key(),
        content_type = %document.content_type(),
        ok,
        "document indexed"
    );
    Ok(Json(DocumentWriteResponse {
        action: "index",
        doc_type: document.document_type(),
        uid: document.uid().unwrap_or_default(),
        ok,
    }))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path((ext_key, content_type, uid)): Path<(String, String, String)>,
) -> Result<Json<DocumentWriteResponse>, DocumentApiError> {
    let mut engine = state.engine();
    let ok = engine
        .index_delete_by_content_uid(&uid, &ext_key, &content_type)
        .await?;
    info!(ext_key = %ext_key, content_type = %content_type, uid = %uid, ok, "document deleted");
    Ok(Json(DocumentWriteResponse {
        action: "delete",
        doc_type: mksearch_core::domain::document::document_type(&ext_key, &content_type),
        uid,
        ok,
    }))
}

fn build_document(
    engine: &ElasticSearchEngine,
    payload: &DocumentPayload,
) -> Result<IndexerDocument, DocumentApiError> {
    let mut document = engine.make_index_doc_instance(&payload.ext_key, &payload.content_type);
    match &payload.uid {
        Value::String(uid) if !uid.trim().is_empty() => document.set_uid(uid.trim()),
        Value::Number(uid) => document.set_uid(uid.as_i64().ok_or(DocumentApiError::InvalidUid)?),
        _ => return Err(DocumentApiError::InvalidUid),
    }
    for (name, value) in &payload.fields {
        if value.is_null() {
            continue;
        }
        let value = field_value(value).ok_or_else(|| DocumentApiError::InvalidField(name.clone()))?;
        document.add_field(name.as_str(), value);
    }
    Ok(document)
}

fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(text) => Some(FieldValue::Text(text.clone())),
        Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| number.as_f64().map(FieldValue::Float)),
        _ => None,
    }
}

impl IntoResponse for DocumentApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            DocumentApiError::InvalidUid | DocumentApiError::InvalidField(_) => {
                StatusCode::BAD_REQUEST
            }
            DocumentApiError::Engine(err) => {
                error!(error = %err, "document write failed");
                engine_error_status(err)
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mksearch_core::domain::engine_config::EngineConfig;
    use mksearch_infra::search::HttpConnector;
    use serde_json::json;

    fn engine() -> ElasticSearchEngine {
        ElasticSearchEngine::new(
            Arc::new(HttpConnector::new(reqwest::Client::new())),
            Arc::new(EngineConfig::default()),
        )
    }

    fn payload(value: Value) -> DocumentPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn builds_document_from_payload() {
        let payload = payload(json!({
            "extKey": "tt_news",
            "contentType": "news",
            "uid": 12,
            "fields": {"title": "Hello", "hidden": false, "rating": 4.5, "skip": null}
        }));
        let document = build_document(&engine(), &payload).unwrap();
        assert_eq!(document.document_type(), "tt_news:news");
        assert_eq!(document.uid().as_deref(), Some("12"));
        let source = document.to_source();
        assert_eq!(source["title"], "Hello");
        assert_eq!(source["hidden"], false);
        assert_eq!(source["rating"], 4.5);
        assert!(!source.contains_key("skip"));
    }

    #[test]
    fn string_uid_is_accepted() {
        let payload = payload(json!({"extKey": "core", "contentType": "page", "uid": " 7 "}));
        let document = build_document(&engine(), &payload).unwrap();
        assert_eq!(document.uid().as_deref(), Some("7"));
    }

    #[test]
    fn rejects_missing_uid_and_nested_values() {
        let payload_without_uid =
            payload(json!({"extKey": "core", "contentType": "page", "uid": null}));
        assert!(matches!(
            build_document(&engine(), &payload_without_uid),
            Err(DocumentApiError::InvalidUid)
        ));

        let nested = payload(json!({
            "extKey": "core",
            "contentType": "page",
            "uid": 1,
            "fields": {"tags": ["a", "b"]}
        }));
        assert!(matches!(
            build_document(&engine(), &nested),
            Err(DocumentApiError::InvalidField(ref name)) if name == "tags"
        ));
    }
}
