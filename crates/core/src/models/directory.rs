//! Directory-service account status models.

use serde::{Deserialize, Serialize};

/// userAccountControl flag for a disabled account (bit 0x2, ACCOUNTDISABLE).
pub const UAC_ACCOUNT_DISABLED: u32 = 0x2;

/// Normalized account status derived from directory attributes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LdapStatus {
    #[serde(rename = "ATIVO")]
    Ativo,
    #[serde(rename = "BLOQUEADO")]
    Bloqueado,
    #[serde(rename = "DESATIVO")]
    Desativo,
    #[serde(rename = "NAO_ENCONTRADO")]
    NaoEncontrado,
}

impl LdapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LdapStatus::Ativo => "ATIVO",
            LdapStatus::Bloqueado => "BLOQUEADO",
            LdapStatus::Desativo => "DESATIVO",
            LdapStatus::NaoEncontrado => "NAO_ENCONTRADO",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "ATIVO" => LdapStatus::Ativo,
            "BLOQUEADO" => LdapStatus::Bloqueado,
            "DESATIVO" => LdapStatus::Desativo,
            _ => LdapStatus::NaoEncontrado,
        }
    }
}

/// Whether the login exists in the HR system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SguStatus {
    #[serde(rename = "ENCONTRADO")]
    Encontrado,
    #[serde(rename = "NAO_ENCONTRADO")]
    NaoEncontrado,
}

impl SguStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SguStatus::Encontrado => "ENCONTRADO",
            SguStatus::NaoEncontrado => "NAO_ENCONTRADO",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "ENCONTRADO" => SguStatus::Encontrado,
            _ => SguStatus::NaoEncontrado,
        }
    }
}

/// One HR login row. The login can exist while its unit stays unresolved
/// (the org-chart table has no row for the unit id), so a known login with
/// `unit: None` is still ENCONTRADO.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SguLoginRecord {
    pub unit: Option<String>,
}

/// Raw attributes read for one account from the directory service.
///
/// A failed lookup (network or protocol) is represented as `exists: false`,
/// indistinguishable downstream from "no such account" except for logging.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectoryAccountStatus {
    pub exists: bool,
    /// userAccountControl bitmask; bit 0x2 means disabled.
    pub account_control: u32,
    /// lockoutTime attribute as returned by the directory; "0" means unlocked.
    pub lockout_time: Option<String>,
    /// Most recent of lastLogon/lastLogonTimestamp, in 100-ns ticks since 1601.
    pub last_logon: Option<i64>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl DirectoryAccountStatus {
    /// A value representing a login the directory could not resolve.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Derive the normalized status.
    ///
    /// Precedence: NAO_ENCONTRADO if the account does not exist, then
    /// DESATIVO (disabled bit), then BLOQUEADO (non-zero lockout), else ATIVO.
    pub fn status(&self) -> LdapStatus {
        if !self.exists {
            return LdapStatus::NaoEncontrado;
        }
        if self.account_control & UAC_ACCOUNT_DISABLED != 0 {
            return LdapStatus::Desativo;
        }
        if let Some(ref lockout) = self.lockout_time {
            if lockout != "0" && !lockout.is_empty() {
                return LdapStatus::Bloqueado;
            }
        }
        LdapStatus::Ativo
    }
}
