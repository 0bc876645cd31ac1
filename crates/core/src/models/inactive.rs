//! Inactive user/computer tracking models.
//!
//! Separate from tickets: these track accounts flagged only for inactivity,
//! upserted by their name and moved through a small analyst-driven status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analyst decision for an inactive entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InactiveStatus {
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "EXCLUIR")]
    Excluir,
    #[serde(rename = "MANTER")]
    Manter,
    #[serde(rename = "BLOQUEAR")]
    Bloquear,
}

impl InactiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InactiveStatus::Pendente => "PENDENTE",
            InactiveStatus::Excluir => "EXCLUIR",
            InactiveStatus::Manter => "MANTER",
            InactiveStatus::Bloquear => "BLOQUEAR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDENTE" => Some(InactiveStatus::Pendente),
            "EXCLUIR" => Some(InactiveStatus::Excluir),
            "MANTER" => Some(InactiveStatus::Manter),
            "BLOQUEAR" => Some(InactiveStatus::Bloquear),
            _ => None,
        }
    }
}

/// A user account flagged for inactivity (unique key: `username`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InactiveUser {
    pub username: String,
    pub display_name: Option<String>,
    pub days_inactive: i64,
    pub last_logon: Option<DateTime<Utc>>,
    pub status: InactiveStatus,
    pub alterado_por: String,
    pub updated_at: DateTime<Utc>,
}

/// A computer account flagged for inactivity (unique key: `name`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InactiveComputer {
    pub name: String,
    pub operating_system: Option<String>,
    pub days_inactive: i64,
    pub last_logon: Option<DateTime<Utc>>,
    pub status: InactiveStatus,
    pub alterado_por: String,
    pub updated_at: DateTime<Utc>,
}
