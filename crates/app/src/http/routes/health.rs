use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
pub struct HealthModules {
    pub search: ModuleStatus,
    pub admin: AdminStatus,
}

#[derive(Debug, Serialize)]
pub struct ModuleStatus {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub configured: bool,
}

/// Liveness of the front end itself; `/status` probes the search cluster.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let admin_configured = state
        .config
        .admin_token_secret
        .as_ref()
        .is_some_and(|value| !value.is_empty());
    Json(HealthResponse {
        status: "ok",
        modules: HealthModules {
            search: ModuleStatus {
                enabled: !state.config.nosearch,
            },
            admin: AdminStatus {
                configured: admin_configured,
            },
        },
    })
}
