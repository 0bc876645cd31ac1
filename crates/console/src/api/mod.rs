//! JSON API endpoints for the admin frontend.
//!
//! Routes are mounted under `/api` by the parent router. Handlers answer
//! with plain JSON bodies; errors use the `{ "error": "..." }` shape with
//! a status code derived from the error kind.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use vigia_core::db::repository::AuditRepository;
use vigia_core::error::VigiaError;

use crate::{auth, AppState};

pub mod inactive;
pub mod reconcile;
pub mod resolve;
pub mod tickets;

/// Build the API sub-router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/session", get(auth::session_info))
        .route("/logout", post(auth::logout))
        .route("/reconcile", post(reconcile::run_reconciliation))
        .route("/resolve", post(resolve::resolve_batch))
        .route("/tickets", get(tickets::list_tickets))
        .route(
            "/tickets/:username",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/:username/status", post(tickets::set_status))
        .route("/tickets/:username/close", post(tickets::close_ticket))
        .route("/tickets/:username/reopen", post(tickets::reopen_ticket))
        .route("/inactive/users", get(inactive::list_users))
        .route("/inactive/users/:username", put(inactive::set_user_status))
        .route("/inactive/computers", get(inactive::list_computers))
        .route(
            "/inactive/computers/:name",
            put(inactive::set_computer_status),
        )
        .route("/audit", get(list_audit))
}

/// Default actor recorded when a request does not name one.
pub(crate) const DEFAULT_ACTOR: &str = "admin";

/// Map a domain error onto an HTTP response.
pub(crate) fn error_response(e: &VigiaError) -> Response {
    let status = match e {
        VigiaError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"error": e.to_string()}))).into_response()
}

pub(crate) fn not_found(what: &str, key: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("{what} '{key}' not found")})),
    )
        .into_response()
}

// -- Audit --

/// GET /api/audit - Most recent audit log entries.
async fn list_audit(State(state): State<Arc<AppState>>) -> Response {
    match state.repo.list_audit_log(200).await {
        Ok(entries) => Json(json!({"entries": entries})).into_response(),
        Err(e) => error_response(&e),
    }
}
