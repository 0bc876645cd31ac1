//! Ticket workflow endpoints.
//!
//! Tickets are keyed by login. The auto-owned half of a ticket is written
//! by resolution ([`crate::api::resolve`]); these handlers only touch the
//! analyst-owned fields and the lifecycle flags.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use vigia_core::db::repository::{AuditRepository, TicketFilter, TicketRepository};
use vigia_core::models::ticket::TicketStatus;

use crate::api::{error_response, not_found, DEFAULT_ACTOR};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<String>,
    pub fechado: Option<bool>,
}

/// GET /api/tickets - List tickets, optionally filtered by workflow
/// status and open/closed state.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TicketListQuery>,
) -> Response {
    let status_ticket = match query.status.as_deref() {
        Some(raw) => match TicketStatus::parse(raw) {
            Some(st) => Some(st),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": format!("unknown ticket status '{raw}'")})),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = TicketFilter {
        status_ticket,
        fechado: query.fechado,
    };
    match state.repo.list_tickets(&filter).await {
        Ok(tickets) => Json(json!({"tickets": tickets})).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/tickets/:username
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    match state.repo.get_ticket(&username).await {
        Ok(Some(ticket)) => Json(ticket).into_response(),
        Ok(None) => not_found("ticket", &username),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status_ticket: Option<String>,
    pub acao: Option<String>,
    pub actor: Option<String>,
}

/// PUT /api/tickets/:username - Update the analyst-owned fields.
///
/// `acao` present in the body replaces the stored action, including an
/// explicit empty string to clear it; absent leaves it untouched.
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> Response {
    let mut ticket = match state.repo.get_ticket(&username).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found("ticket", &username),
        Err(e) => return error_response(&e),
    };

    if let Some(raw) = req.status_ticket.as_deref() {
        match TicketStatus::parse(raw) {
            Some(st) => ticket.status_ticket = st,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": format!("unknown ticket status '{raw}'")})),
                )
                    .into_response();
            }
        }
    }
    if let Some(acao) = req.acao {
        ticket.acao = if acao.is_empty() { None } else { Some(acao) };
    }

    let actor = req.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
    ticket.alterado_por = actor.to_string();
    ticket.updated_at = Utc::now();

    if let Err(e) = state.repo.upsert_ticket(&ticket).await {
        return error_response(&e);
    }
    let _ = state
        .repo
        .log_action(
            "ticket_updated",
            Some(&format!("{username}: {}", ticket.status_ticket.as_str())),
            None,
        )
        .await;
    Json(ticket).into_response()
}

/// DELETE /api/tickets/:username
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    match state.repo.delete_ticket(&username).await {
        Ok(true) => {
            let _ = state
                .repo
                .log_action("ticket_deleted", Some(&username), None)
                .await;
            Json(json!({"ok": true})).into_response()
        }
        Ok(false) => not_found("ticket", &username),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
    pub actor: Option<String>,
}

/// POST /api/tickets/:username/status - Set the workflow status.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Response {
    let status = match TicketStatus::parse(&req.status) {
        Some(st) => st,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("unknown ticket status '{}'", req.status)})),
            )
                .into_response();
        }
    };

    let mut ticket = match state.repo.get_ticket(&username).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found("ticket", &username),
        Err(e) => return error_response(&e),
    };

    ticket.status_ticket = status;
    ticket.alterado_por = req.actor.as_deref().unwrap_or(DEFAULT_ACTOR).to_string();
    ticket.updated_at = Utc::now();

    if let Err(e) = state.repo.upsert_ticket(&ticket).await {
        return error_response(&e);
    }
    let _ = state
        .repo
        .log_action(
            "ticket_status",
            Some(&format!("{username}: {}", status.as_str())),
            None,
        )
        .await;
    Json(ticket).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct LifecycleRequest {
    pub actor: Option<String>,
}

/// POST /api/tickets/:username/close
pub async fn close_ticket(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<LifecycleRequest>,
) -> Response {
    set_fechado(state, &username, true, req.actor.as_deref()).await
}

/// POST /api/tickets/:username/reopen
pub async fn reopen_ticket(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<LifecycleRequest>,
) -> Response {
    set_fechado(state, &username, false, req.actor.as_deref()).await
}

async fn set_fechado(
    state: Arc<AppState>,
    username: &str,
    fechado: bool,
    actor: Option<&str>,
) -> Response {
    let mut ticket = match state.repo.get_ticket(username).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found("ticket", username),
        Err(e) => return error_response(&e),
    };

    ticket.fechado = fechado;
    ticket.alterado_por = actor.unwrap_or(DEFAULT_ACTOR).to_string();
    ticket.updated_at = Utc::now();

    if let Err(e) = state.repo.upsert_ticket(&ticket).await {
        return error_response(&e);
    }
    let action = if fechado {
        "ticket_closed"
    } else {
        "ticket_reopened"
    };
    let _ = state.repo.log_action(action, Some(username), None).await;
    Json(ticket).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigia_core::config::VigiaConfig;
    use vigia_core::db::sqlite::SqliteRepository;
    use vigia_core::db::DatabasePool;
    use vigia_core::models::directory::{LdapStatus, SguStatus};
    use vigia_core::models::ticket::{ResolvedIdentity, Ticket};
    use vigia_core::sgu::SguClient;

    async fn test_state() -> Arc<AppState> {
        let DatabasePool::Sqlite(pool) = DatabasePool::new_sqlite_memory().await.unwrap();
        let repo = Arc::new(SqliteRepository::new(pool));
        let config = VigiaConfig::generate_default();
        let sgu = SguClient::connect_lazy(&config.sgu).unwrap();
        Arc::new(AppState::new(config, repo, sgu))
    }

    fn sample_ticket(username: &str) -> Ticket {
        let identity = ResolvedIdentity {
            username: username.to_string(),
            display_name: Some("Joao Silva".to_string()),
            email: None,
            department_ldap: Some("DTI".to_string()),
            department_sgu: None,
            status_ldap: LdapStatus::Ativo,
            status_sgu: SguStatus::NaoEncontrado,
            days_inactive: 30,
        };
        Ticket::from_resolution(&identity, "analista1", Utc::now())
    }

    #[tokio::test]
    async fn get_missing_ticket_is_404() {
        let state = test_state().await;
        let resp = get_ticket(State(state), Path("nobody".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_existing_ticket_is_200() {
        let state = test_state().await;
        state.repo.upsert_ticket(&sample_ticket("jsilva")).await.unwrap();
        let resp = get_ticket(State(state), Path("jsilva".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn set_status_rejects_unknown_value() {
        let state = test_state().await;
        state.repo.upsert_ticket(&sample_ticket("jsilva")).await.unwrap();
        let resp = set_status(
            State(state),
            Path("jsilva".to_string()),
            Json(SetStatusRequest {
                status: "APAGAR".to_string(),
                actor: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn set_status_persists_decision() {
        let state = test_state().await;
        state.repo.upsert_ticket(&sample_ticket("jsilva")).await.unwrap();
        let resp = set_status(
            State(state.clone()),
            Path("jsilva".to_string()),
            Json(SetStatusRequest {
                status: "BLOQUEAR".to_string(),
                actor: Some("analista2".to_string()),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = state.repo.get_ticket("jsilva").await.unwrap().unwrap();
        assert_eq!(stored.status_ticket, TicketStatus::Bloquear);
        assert_eq!(stored.alterado_por, "analista2");
    }

    #[tokio::test]
    async fn close_and_reopen_toggle_fechado() {
        let state = test_state().await;
        state.repo.upsert_ticket(&sample_ticket("jsilva")).await.unwrap();

        close_ticket(
            State(state.clone()),
            Path("jsilva".to_string()),
            Json(LifecycleRequest::default()),
        )
        .await;
        assert!(state.repo.get_ticket("jsilva").await.unwrap().unwrap().fechado);

        reopen_ticket(
            State(state.clone()),
            Path("jsilva".to_string()),
            Json(LifecycleRequest::default()),
        )
        .await;
        assert!(!state.repo.get_ticket("jsilva").await.unwrap().unwrap().fechado);
    }

    #[tokio::test]
    async fn update_clears_acao_with_empty_string() {
        let state = test_state().await;
        let mut ticket = sample_ticket("jsilva");
        ticket.acao = Some("verificar com chefia".to_string());
        state.repo.upsert_ticket(&ticket).await.unwrap();

        update_ticket(
            State(state.clone()),
            Path("jsilva".to_string()),
            Json(UpdateTicketRequest {
                status_ticket: None,
                acao: Some(String::new()),
                actor: None,
            }),
        )
        .await;

        let stored = state.repo.get_ticket("jsilva").await.unwrap().unwrap();
        assert!(stored.acao.is_none());
    }

    #[tokio::test]
    async fn delete_ticket_then_404() {
        let state = test_state().await;
        state.repo.upsert_ticket(&sample_ticket("jsilva")).await.unwrap();

        let resp = delete_ticket(State(state.clone()), Path("jsilva".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = delete_ticket(State(state), Path("jsilva".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
