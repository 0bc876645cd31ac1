//! Ticket models — the persisted, analyst-actionable record for one login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::{LdapStatus, SguStatus};

/// Sentinel `days_inactive` value meaning "no valid last logon ever observed".
pub const DAYS_INACTIVE_NEVER: i64 = 999;

/// Analyst-driven workflow state. No automatic transitions exist beyond the
/// initial PENDENTE assigned on creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TicketStatus {
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "EXCLUIR")]
    Excluir,
    #[serde(rename = "MANTER")]
    Manter,
    #[serde(rename = "TRANSFERIR")]
    Transferir,
    #[serde(rename = "BLOQUEAR")]
    Bloquear,
    #[serde(rename = "DESBLOQUEAR")]
    Desbloquear,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pendente => "PENDENTE",
            TicketStatus::Excluir => "EXCLUIR",
            TicketStatus::Manter => "MANTER",
            TicketStatus::Transferir => "TRANSFERIR",
            TicketStatus::Bloquear => "BLOQUEAR",
            TicketStatus::Desbloquear => "DESBLOQUEAR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDENTE" => Some(TicketStatus::Pendente),
            "EXCLUIR" => Some(TicketStatus::Excluir),
            "MANTER" => Some(TicketStatus::Manter),
            "TRANSFERIR" => Some(TicketStatus::Transferir),
            "BLOQUEAR" => Some(TicketStatus::Bloquear),
            "DESBLOQUEAR" => Some(TicketStatus::Desbloquear),
            _ => None,
        }
    }
}

/// The merged directory + HR view of one login, produced by the Identity
/// Resolver. This is the auto-owned half of a [`Ticket`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedIdentity {
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// Department string from the directory service.
    pub department_ldap: Option<String>,
    /// Organizational unit from the HR system; a separate source kept apart.
    pub department_sgu: Option<String>,
    pub status_ldap: LdapStatus,
    pub status_sgu: SguStatus,
    pub days_inactive: i64,
}

/// One persisted tracking record per login (unique key: `username`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub department_ldap: Option<String>,
    pub department_sgu: Option<String>,
    pub status_ldap: LdapStatus,
    pub status_sgu: SguStatus,
    pub status_ticket: TicketStatus,
    /// Planned remediation action, free text set by the analyst.
    pub acao: Option<String>,
    pub fechado: bool,
    pub days_inactive: i64,
    pub criado_por: String,
    pub alterado_por: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Build a fresh ticket from a first-time resolution. Workflow state
    /// starts at PENDENTE, open.
    pub fn from_resolution(identity: &ResolvedIdentity, actor: &str, now: DateTime<Utc>) -> Self {
        Self {
            username: identity.username.clone(),
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            department_ldap: identity.department_ldap.clone(),
            department_sgu: identity.department_sgu.clone(),
            status_ldap: identity.status_ldap,
            status_sgu: identity.status_sgu,
            status_ticket: TicketStatus::Pendente,
            acao: None,
            fechado: false,
            days_inactive: identity.days_inactive,
            criado_por: actor.to_string(),
            alterado_por: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a re-resolution into an existing ticket.
    ///
    /// Auto-owned fields (directory/HR-derived: names, departments, statuses,
    /// days inactive) are overwritten. Analyst-owned fields (`status_ticket`,
    /// `acao`, `fechado`) and the creation audit pair are preserved so that
    /// manual decisions survive automatic re-resolution.
    pub fn merge_resolution(
        &self,
        incoming: &ResolvedIdentity,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            username: self.username.clone(),
            display_name: incoming.display_name.clone(),
            email: incoming.email.clone(),
            department_ldap: incoming.department_ldap.clone(),
            department_sgu: incoming.department_sgu.clone(),
            status_ldap: incoming.status_ldap,
            status_sgu: incoming.status_sgu,
            status_ticket: self.status_ticket,
            acao: self.acao.clone(),
            fechado: self.fechado,
            days_inactive: incoming.days_inactive,
            criado_por: self.criado_por.clone(),
            alterado_por: actor.to_string(),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}
