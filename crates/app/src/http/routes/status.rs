use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;
use mksearch_core::domain::status::EngineStatus;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub index: String,
    pub code: i8,
    pub message: String,
    #[serde(flatten)]
    pub status: EngineStatus,
}

impl StatusResponse {
    pub fn new(index: impl Into<String>, status: EngineStatus) -> Self {
        Self {
            index: index.into(),
            code: status.code(),
            message: status.message(),
            status,
        }
    }
}

pub async fn get_status(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let status = state.engine().get_status().await;
    let code = if status.is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(StatusResponse::new(state.index_model.title.clone(), status)),
    )
}

#[cfg(test)]
mod tests {
    use super::StatusResponse;
    use mksearch_core::domain::status::EngineStatus;
    use serde_json::json;

    #[test]
    fn status_response_shape() {
        let response = StatusResponse::new("typo3", EngineStatus::Up { ping_ms: 1.5 });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "index": "typo3",
                "code": 1,
                "message": "Up and running (Ping time: 1.5 ms)",
                "state": "up",
                "ping_ms": 1.5
            })
        );
    }

    #[test]
    fn down_response_shape() {
        let response = StatusResponse::new("typo3", EngineStatus::Down);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["code"], -1);
        assert_eq!(value["state"], "down");
        assert_eq!(value["message"], "Down. Maybe not started?");
    }
}
