use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use mksearch_core::types::credentials::{Credentials, ServerAddress};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::search::backend::{
    BackendConnector, BackendDocument, BackendError, BackendResponse, DocumentRef, RequestEcho,
    SearchBackend, SearchExchange,
};
use crate::search::options::BackendOptions;
use crate::search::query_builder::BackendQuery;

const NDJSON: &str = "application/x-ndjson";
const DEFAULT_SCROLL: &str = "1m";

/// Creates HTTP backends sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    http: Client,
}

impl HttpConnector {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl BackendConnector for HttpConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn SearchBackend>, BackendError> {
        let backend: Arc<dyn SearchBackend> =
            Arc::new(ElasticHttpBackend::new(self.http.clone(), credentials.servers())?);
        Ok(backend)
    }
}

/// Elasticsearch REST client. Servers are tried in order until one answers.
#[derive(Debug, Clone)]
pub struct ElasticHttpBackend {
    http: Client,
    servers: Vec<Url>,
}

enum RequestBody {
    Json(String),
    NdJson(String),
}

impl RequestBody {
    fn as_str(&self) -> &str {
        match self {
            RequestBody::Json(data) | RequestBody::NdJson(data) => data,
        }
    }
}

impl ElasticHttpBackend {
    pub fn new(http: Client, servers: &[ServerAddress]) -> Result<Self, BackendError> {
        let servers = servers
            .iter()
            .map(server_base_url)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { http, servers })
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&RequestBody>,
    ) -> Result<BackendResponse, BackendError> {
        let mut last_error = None;
        for base in &self.servers {
            let url = base.join(path)?;
            let mut request = self.http.request(method.clone(), url);
            if !query.is_empty() {
                request = request.query(query);
            }
            request = match body {
                Some(RequestBody::Json(data)) => request
                    .header(CONTENT_TYPE, "application/json")
                    .body(data.clone()),
                Some(RequestBody::NdJson(data)) => {
                    request.header(CONTENT_TYPE, NDJSON).body(data.clone())
                }
                None => request,
            };
            let started = Instant::now();
            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let text = response.text().await?;
                    let elapsed = started.elapsed();
                    debug!(%method, server = %base, path, status, "elasticsearch request done");
                    return Ok(BackendResponse {
                        status,
                        body: parse_body(text),
                        elapsed,
                    });
                }
                Err(err) if err.is_connect() || err.is_timeout() => {
                    warn!(server = %base, error = %err, "elasticsearch server unreachable");
                    last_error = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(match last_error {
            Some(err) => BackendError::Unreachable(err.to_string()),
            None => BackendError::Unreachable("no servers configured".to_string()),
        })
    }

    async fn expect_success(
        &self,
        method: Method,
        path: &str,
        body: Option<&RequestBody>,
    ) -> Result<BackendResponse, BackendError> {
        let response = self.execute(method, path, &[], body).await?;
        if !(200..300).contains(&response.status) {
            return Err(BackendError::Status {
                status: response.status,
                path: path.to_string(),
                body: response.body.to_string(),
            });
        }
        Ok(response)
    }

    async fn bulk(&self, payload: String) -> Result<bool, BackendError> {
        let response = self
            .expect_success(Method::POST, "_bulk", Some(&RequestBody::NdJson(payload)))
            .await?;
        Ok(!bulk_has_errors(&response.body))
    }
}

#[async_trait]
impl SearchBackend for ElasticHttpBackend {
    async fn search(
        &self,
        index: &str,
        query: &BackendQuery,
        options: &BackendOptions,
    ) -> Result<SearchExchange, BackendError> {
        let (path, pairs, body) = match options.scroll_id() {
            Some(scroll_id) => {
                let scroll = options.scroll().unwrap_or_else(|| DEFAULT_SCROLL.to_string());
                let body = json!({"scroll": scroll, "scroll_id": scroll_id});
                ("_search/scroll".to_string(), Vec::new(), body.to_string())
            }
            None => (
                format!("{index}/_search"),
                options.query_pairs(),
                query.to_string(),
            ),
        };
        let body = RequestBody::Json(body);
        let response = self.execute(Method::POST, &path, &pairs, Some(&body)).await?;
        Ok(SearchExchange {
            request: RequestEcho {
                path,
                query: encode_query(&pairs),
                data: body.as_str().to_string(),
            },
            response,
        })
    }

    async fn add_documents(
        &self,
        index: &str,
        documents: &[BackendDocument],
    ) -> Result<bool, BackendError> {
        if documents.is_empty() {
            return Ok(true);
        }
        self.bulk(index_payload(index, documents)?).await
    }

    async fn delete_documents(
        &self,
        index: &str,
        documents: &[DocumentRef],
    ) -> Result<bool, BackendError> {
        if documents.is_empty() {
            return Ok(true);
        }
        self.bulk(delete_payload(index, documents)?).await
    }

    async fn status(&self) -> Result<BackendResponse, BackendError> {
        self.execute(Method::GET, "_stats", &[], None).await
    }

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        let response = self.execute(Method::HEAD, index, &[], None).await?;
        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(BackendError::Status {
                status,
                path: index.to_string(),
                body: response.body.to_string(),
            }),
        }
    }

    async fn create_index(&self, index: &str) -> Result<(), BackendError> {
        self.expect_success(Method::PUT, index, None).await?;
        Ok(())
    }

    async fn open_index(&self, index: &str) -> Result<(), BackendError> {
        self.expect_success(Method::POST, &format!("{index}/_open"), None)
            .await?;
        Ok(())
    }

    async fn close_index(&self, index: &str) -> Result<(), BackendError> {
        self.expect_success(Method::POST, &format!("{index}/_close"), None)
            .await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), BackendError> {
        self.expect_success(Method::DELETE, index, None).await?;
        Ok(())
    }

    async fn optimize_index(&self, index: &str) -> Result<(), BackendError> {
        self.expect_success(Method::POST, &format!("{index}/_forcemerge"), None)
            .await?;
        Ok(())
    }
}

fn server_base_url(server: &ServerAddress) -> Result<Url, BackendError> {
    let raw = if server.path.is_empty() {
        format!("http://{}:{}/", server.host, server.port)
    } else {
        format!("http://{}:{}/{}/", server.host, server.port, server.path)
    };
    Ok(Url::parse(&raw)?)
}

fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn encode_query(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn index_payload(index: &str, documents: &[BackendDocument]) -> Result<String, BackendError> {
    let mut payload = String::new();
    for document in documents {
        let action = json!({
            "index": {"_index": index, "_type": document.doc_type, "_id": document.id}
        });
        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(&document.source)?);
        payload.push('\n');
    }
    Ok(payload)
}

fn delete_payload(index: &str, documents: &[DocumentRef]) -> Result<String, BackendError> {
    let mut payload = String::new();
    for document in documents {
        let action = json!({
            "delete": {"_index": index, "_type": document.doc_type, "_id": document.id}
        });
        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
    }
    Ok(payload)
}

fn bulk_has_errors(body: &Value) -> bool {
    body.get("errors").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn server(path: &str) -> ServerAddress {
        ServerAddress {
            host: "es.local".to_string(),
            port: 9200,
            path: path.to_string(),
        }
    }

    #[test]
    fn base_url_with_and_without_path() {
        let plain = server_base_url(&server("")).unwrap();
        assert_eq!(plain.join("idx/_search").unwrap().as_str(), "http://es.local:9200/idx/_search");
        let nested = server_base_url(&server("proxy/es")).unwrap();
        assert_eq!(
            nested.join("idx/_search").unwrap().as_str(),
            "http://es.local:9200/proxy/es/idx/_search"
        );
    }

    #[test]
    fn bulk_index_payload_is_ndjson() {
        let mut source = Map::new();
        source.insert("title".to_string(), Value::from("Hi"));
        let payload = index_payload(
            "typo3",
            &[BackendDocument {
                id: "5".to_string(),
                doc_type: "tt_news:news".to_string(),
                source,
            }],
        )
        .unwrap();
        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(lines.len(), 2);
        let action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_id"], "5");
        assert_eq!(action["index"]["_type"], "tt_news:news");
        assert_eq!(action["index"]["_index"], "typo3");
        let doc: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(doc["title"], "Hi");
        assert!(payload.ends_with('\n'));
    }

    #[test]
    fn bulk_delete_payload() {
        let payload = delete_payload(
            "typo3",
            &[DocumentRef {
                id: "5".to_string(),
                doc_type: "core:page".to_string(),
            }],
        )
        .unwrap();
        let action: Value = serde_json::from_str(payload.trim()).unwrap();
        assert_eq!(action["delete"]["_id"], "5");
        assert_eq!(action["delete"]["_type"], "core:page");
    }

    #[test]
    fn bulk_errors_flag() {
        assert!(bulk_has_errors(&json!({"errors": true, "items": []})));
        assert!(!bulk_has_errors(&json!({"errors": false})));
        assert!(!bulk_has_errors(&Value::Null));
    }

    #[test]
    fn query_echo_is_url_encoded() {
        let pairs = vec![
            ("size".to_string(), "10".to_string()),
            ("routing".to_string(), "a b".to_string()),
        ];
        assert_eq!(encode_query(&pairs), "size=10&routing=a+b");
    }

    #[test]
    fn body_parsing_tolerates_plain_text() {
        assert_eq!(parse_body(String::new()), Value::Null);
        assert_eq!(parse_body("{\"a\":1}".to_string()), json!({"a": 1}));
        assert_eq!(parse_body("oops".to_string()), Value::from("oops"));
    }
}
