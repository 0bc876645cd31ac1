//! Inactive user and computer tracking endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use vigia_core::db::repository::{
    AuditRepository, InactiveComputerRepository, InactiveUserRepository,
};
use vigia_core::models::inactive::InactiveStatus;

use crate::api::{error_response, not_found, DEFAULT_ACTOR};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetInactiveStatusRequest {
    pub status: String,
    pub actor: Option<String>,
}

fn parse_status(raw: &str) -> Result<InactiveStatus, Response> {
    InactiveStatus::parse(raw).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("unknown status '{raw}'")})),
        )
            .into_response()
    })
}

/// GET /api/inactive/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Response {
    match state.repo.list_inactive_users().await {
        Ok(users) => Json(json!({"users": users})).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/inactive/users/:username - Record the analyst decision.
pub async fn set_user_status(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<SetInactiveStatusRequest>,
) -> Response {
    let status = match parse_status(&req.status) {
        Ok(st) => st,
        Err(resp) => return resp,
    };
    let actor = req.actor.as_deref().unwrap_or(DEFAULT_ACTOR);

    match state
        .repo
        .set_inactive_user_status(&username, status, actor)
        .await
    {
        Ok(true) => {
            let _ = state
                .repo
                .log_action(
                    "inactive_user_status",
                    Some(&format!("{username}: {}", status.as_str())),
                    None,
                )
                .await;
            Json(json!({"ok": true})).into_response()
        }
        Ok(false) => not_found("inactive user", &username),
        Err(e) => error_response(&e),
    }
}

/// GET /api/inactive/computers
pub async fn list_computers(State(state): State<Arc<AppState>>) -> Response {
    match state.repo.list_inactive_computers().await {
        Ok(computers) => Json(json!({"computers": computers})).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/inactive/computers/:name - Record the analyst decision.
pub async fn set_computer_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<SetInactiveStatusRequest>,
) -> Response {
    let status = match parse_status(&req.status) {
        Ok(st) => st,
        Err(resp) => return resp,
    };
    let actor = req.actor.as_deref().unwrap_or(DEFAULT_ACTOR);

    match state
        .repo
        .set_inactive_computer_status(&name, status, actor)
        .await
    {
        Ok(true) => {
            let _ = state
                .repo
                .log_action(
                    "inactive_computer_status",
                    Some(&format!("{name}: {}", status.as_str())),
                    None,
                )
                .await;
            Json(json!({"ok": true})).into_response()
        }
        Ok(false) => not_found("inactive computer", &name),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vigia_core::config::VigiaConfig;
    use vigia_core::db::sqlite::SqliteRepository;
    use vigia_core::db::DatabasePool;
    use vigia_core::models::inactive::InactiveUser;
    use vigia_core::sgu::SguClient;

    async fn test_state() -> Arc<AppState> {
        let DatabasePool::Sqlite(pool) = DatabasePool::new_sqlite_memory().await.unwrap();
        let repo = Arc::new(SqliteRepository::new(pool));
        let config = VigiaConfig::generate_default();
        let sgu = SguClient::connect_lazy(&config.sgu).unwrap();
        Arc::new(AppState::new(config, repo, sgu))
    }

    #[tokio::test]
    async fn set_status_unknown_user_is_404() {
        let state = test_state().await;
        let resp = set_user_status(
            State(state),
            Path("ninguem".to_string()),
            Json(SetInactiveStatusRequest {
                status: "MANTER".to_string(),
                actor: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn set_status_records_decision() {
        let state = test_state().await;
        state
            .repo
            .upsert_inactive_user(&InactiveUser {
                username: "jsilva".to_string(),
                display_name: Some("Joao Silva".to_string()),
                days_inactive: 120,
                last_logon: None,
                status: InactiveStatus::Pendente,
                alterado_por: "sistema".to_string(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        let resp = set_user_status(
            State(state.clone()),
            Path("jsilva".to_string()),
            Json(SetInactiveStatusRequest {
                status: "BLOQUEAR".to_string(),
                actor: Some("analista1".to_string()),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = state.repo.get_inactive_user("jsilva").await.unwrap().unwrap();
        assert_eq!(stored.status, InactiveStatus::Bloquear);
        assert_eq!(stored.alterado_por, "analista1");
    }

    #[tokio::test]
    async fn set_status_rejects_ticket_only_value() {
        let state = test_state().await;
        // TRANSFERIR exists for tickets but not for inactive entries
        let resp = set_user_status(
            State(state),
            Path("jsilva".to_string()),
            Json(SetInactiveStatusRequest {
                status: "TRANSFERIR".to_string(),
                actor: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
