//! Batch identity resolution endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use vigia_core::db::repository::AuditRepository;

use crate::api::DEFAULT_ACTOR;
use crate::AppState;

/// Hard cap on one batch; larger lists should be split by the caller.
const MAX_BATCH_LOGINS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub logins: Vec<String>,
    pub actor: Option<String>,
}

/// POST /api/resolve - Resolve a list of logins and upsert their tickets.
pub async fn resolve_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> Response {
    let logins: Vec<String> = req
        .logins
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if logins.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "no logins provided"})),
        )
            .into_response();
    }
    if logins.len() > MAX_BATCH_LOGINS {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("batch limited to {MAX_BATCH_LOGINS} logins")})),
        )
            .into_response();
    }

    let actor = req.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
    let report = state.resolver.resolve_batch(&logins, actor).await;

    let _ = state
        .repo
        .log_action(
            "resolve",
            Some(&format!(
                "{} logins, {} resolved, {} errors",
                logins.len(),
                report.resolved,
                report.errors
            )),
            None,
        )
        .await;

    Json(report).into_response()
}
