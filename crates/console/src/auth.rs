//! Console authentication middleware and handlers.
//!
//! Session-based authentication for the admin API using argon2 password
//! hashing and secure session tokens carried in an HttpOnly cookie.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::json;
use tracing::warn;

use vigia_core::db::repository::{AdminSessionRepository, AuditRepository};
use vigia_core::models::audit::AdminSession;

use crate::AppState;

const SESSION_COOKIE_NAME: &str = "vigia_session";
const SESSION_DURATION_HOURS: i64 = 24;

/// Paths that bypass authentication.
const PUBLIC_PATHS: &[&str] = &["/health", "/api/login"];

/// Check if a path should bypass authentication.
fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| path.starts_with(p))
}

/// Extract session token from cookie header.
fn extract_session_token(req: &Request<Body>) -> Option<String> {
    let cookie_header = req.headers().get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
            return Some(value.to_string());
        }
    }
    None
}

/// Authentication middleware that checks for a valid session cookie.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(req).await;
    }

    // Skip auth if no admin password is configured
    if state.config.vigia.admin_password_hash.is_none() {
        return next.run(req).await;
    }

    if let Some(token) = extract_session_token(&req) {
        if let Ok(Some(session)) = state.repo.get_admin_session(&token).await {
            if session.expires_at > Utc::now() {
                return next.run(req).await;
            }
            // Expired session - clean it up
            let _ = state.repo.delete_admin_session(&token).await;
        }
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "authentication required"})),
    )
        .into_response()
}

/// Generate a random session token (64 hex characters).
fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    hex::encode(&bytes)
}

/// Encode bytes as hex string.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Hash a password using argon2.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = argon2::password_hash::SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// First address of an X-Forwarded-For header, if present.
fn client_ip(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// -- Handlers --

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /api/login - Exchange the admin password for a session cookie.
pub async fn login(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let ip = client_ip(&req);

    let body_bytes = match axum::body::to_bytes(req.into_body(), 1024 * 16).await {
        Ok(b) => b,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid request body"})),
            )
                .into_response();
        }
    };

    let form: LoginRequest = match serde_json::from_slice(&body_bytes) {
        Ok(f) => f,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "expected {\"password\": ...}"})),
            )
                .into_response();
        }
    };

    let password_hash = match &state.config.vigia.admin_password_hash {
        Some(h) => h.clone(),
        None => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "no admin password configured"})),
            )
                .into_response();
        }
    };

    if !verify_password(&form.password, &password_hash) {
        warn!(ip = ?ip, "failed login attempt");
        let _ = state
            .repo
            .log_action("login_failed", None, ip.as_deref())
            .await;
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid password"})),
        )
            .into_response();
    }

    let token = generate_session_token();
    let session = AdminSession {
        token: token.clone(),
        created_at: Utc::now(),
        expires_at: Utc::now() + Duration::hours(SESSION_DURATION_HOURS),
        ip_address: ip.clone(),
    };

    if let Err(e) = state.repo.create_admin_session(&session).await {
        warn!(error = %e, "failed to create session");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "internal error"})),
        )
            .into_response();
    }

    let _ = state.repo.log_action("login", None, ip.as_deref()).await;

    let cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_DURATION_HOURS * 3600
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({"ok": true, "expires_at": session.expires_at})),
    )
        .into_response()
}

/// GET /api/session - Report whether the caller holds a live session.
pub async fn session_info(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    if state.config.vigia.admin_password_hash.is_none() {
        return Json(json!({"authenticated": true, "open_access": true})).into_response();
    }

    if let Some(token) = extract_session_token(&req) {
        if let Ok(Some(session)) = state.repo.get_admin_session(&token).await {
            if session.expires_at > Utc::now() {
                return Json(json!({
                    "authenticated": true,
                    "expires_at": session.expires_at,
                }))
                .into_response();
            }
        }
    }
    Json(json!({"authenticated": false})).into_response()
}

/// POST /api/logout - Delete the session and clear the cookie.
pub async fn logout(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let ip = client_ip(&req);

    if let Some(token) = extract_session_token(&req) {
        let _ = state.repo.delete_admin_session(&token).await;
    }
    let _ = state.repo.log_action("logout", None, ip.as_deref()).await;

    let cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({"ok": true})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() {
        let hash = hash_password("senha-secreta").unwrap();
        assert!(verify_password("senha-secreta", &hash));
        assert!(!verify_password("senha-errada", &hash));
    }

    #[test]
    fn verify_password_with_invalid_hash() {
        assert!(!verify_password("password", "not-a-valid-hash"));
    }

    #[test]
    fn generate_session_token_is_64_hex_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_session_token_is_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn health_and_login_are_public() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/api/login"));
    }

    #[test]
    fn api_routes_are_protected() {
        assert!(!is_public_path("/api/tickets"));
        assert!(!is_public_path("/api/reconcile"));
        assert!(!is_public_path("/api/session"));
    }

    #[test]
    fn hex_encode_works() {
        assert_eq!(hex::encode(&[0x00, 0xff, 0x0a]), "00ff0a");
        assert_eq!(hex::encode(&[]), "");
    }

    #[test]
    fn extract_session_token_from_cookie() {
        let req = Request::builder()
            .header(header::COOKIE, "vigia_session=abc123; other=value")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&req), Some("abc123".to_string()));
    }

    #[test]
    fn extract_session_token_missing_cookie() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_session_token(&req), None);
    }

    #[test]
    fn client_ip_takes_first_forwarded_address() {
        let req = Request::builder()
            .header("x-forwarded-for", "10.1.2.3, 172.16.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), Some("10.1.2.3".to_string()));
    }

    #[test]
    fn client_ip_missing_header() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&req), None);
    }
}
