use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::http::middleware::{admin_auth, search_query_limit};
use crate::http::routes::search::VISITOR_GROUPS_HEADER;
use crate::http::routes::{admin, health, search, status};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state);
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/status", get(status::get_status))
        .route(
            "/search",
            get(search::search)
                .layer(middleware::from_fn(search_query_limit::enforce_search_query_length)),
        )
        .route("/admin/documents", post(admin::documents::post_document))
        .route(
            "/admin/documents/{ext_key}/{content_type}/{uid}",
            delete(admin::documents::delete_document),
        )
        .route("/admin/optimize", post(admin::index::post_optimize))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::require_admin,
        ))
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(state: &AppState) -> Option<CorsLayer> {
    let (allow_any, origins) = parse_origins(&state.config.cors_allow_origins);
    let cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::DELETE,
        Method::OPTIONS,
    ]);

    if !should_enable_cors(allow_any, &origins) {
        return None;
    }

    if allow_any {
        Some(cors.allow_origin(Any).allow_headers(Any))
    } else {
        Some(
            cors.allow_origin(AllowOrigin::list(origins))
                .allow_credentials(true)
                .allow_headers([
                    CONTENT_TYPE,
                    AUTHORIZATION,
                    HeaderName::from_static(VISITOR_GROUPS_HEADER),
                ]),
        )
    }
}

fn parse_origins(configured: &[String]) -> (bool, Vec<HeaderValue>) {
    let mut origins = Vec::new();
    for origin in configured {
        if is_wildcard_origin(origin) {
            return (true, Vec::new());
        }
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => origins.push(value),
            Err(_) => warn!(origin = %origin, "invalid CORS origin ignored"),
        }
    }
    (false, origins)
}

fn is_wildcard_origin(origin: &str) -> bool {
    origin.trim() == "*"
}

fn should_enable_cors(allow_any: bool, origins: &[HeaderValue]) -> bool {
    allow_any || !origins.is_empty()
}
