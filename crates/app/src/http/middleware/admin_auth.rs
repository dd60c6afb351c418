use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::warn;

use crate::http::ErrorBody;
use crate::state::AppState;

pub const ADMIN_PREFIX: &str = "/admin";

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("admin auth not configured")]
    MissingConfig,
    #[error("admin token required")]
    MissingToken,
    #[error("admin token invalid")]
    InvalidToken,
    #[error("admin token could not be signed")]
    Signing,
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminTokenPayload {
    exp: i64,
}

/// Guards every route below [`ADMIN_PREFIX`] with an HMAC-signed bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AdminAuthError> {
    if !is_admin_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let secret = state
        .config
        .admin_token_secret
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(AdminAuthError::MissingConfig)?;

    let token = extract_bearer_token(&request).ok_or(AdminAuthError::MissingToken)?;
    if !verify_token(secret, &token) {
        warn!(path = %request.uri().path(), "rejected admin token");
        return Err(AdminAuthError::InvalidToken);
    }
    Ok(next.run(request).await)
}

pub fn issue_token(secret: &str, max_age_secs: i64) -> Result<String, AdminAuthError> {
    let exp = Utc::now().timestamp().saturating_add(max_age_secs);
    let payload = AdminTokenPayload { exp };
    let json = serde_json::to_vec(&payload).map_err(|_| AdminAuthError::Signing)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(json);
    let signature = sign_token(secret, &payload_b64).ok_or(AdminAuthError::Signing)?;
    Ok(format!("{payload_b64}.{signature}"))
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX
        || path
            .strip_prefix(ADMIN_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn verify_token(secret: &str, token: &str) -> bool {
    let Some((payload_b64, sig)) = token.split_once('.') else {
        return false;
    };
    if payload_b64.is_empty() || sig.is_empty() {
        return false;
    }
    if sign_token(secret, payload_b64).as_deref() != Some(sig) {
        return false;
    }
    match decode_payload(payload_b64) {
        Some(payload) => payload.exp > Utc::now().timestamp(),
        None => false,
    }
}

fn decode_payload(payload_b64: &str) -> Option<AdminTokenPayload> {
    let bytes = URL_SAFE_NO_PAD.decode(payload_b64.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn sign_token(secret: &str, payload_b64: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload_b64.as_bytes());
    let raw = mac.finalize().into_bytes();
    Some(URL_SAFE_NO_PAD.encode(raw))
}

fn extract_bearer_token<B>(request: &Request<B>) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let value = header.trim().strip_prefix("Bearer ")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AdminAuthError::MissingConfig => StatusCode::SERVICE_UNAVAILABLE,
            AdminAuthError::MissingToken | AdminAuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AdminAuthError::Signing => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
