//! LDAP client wrapper for read-only Active Directory queries.

use std::time::Duration;

use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::debug;
use vigia_core::config::DirectoryConfig;
use vigia_core::error::{Result, VigiaError};
use vigia_core::models::directory::DirectoryAccountStatus;

/// Attributes fetched for every account lookup.
const ACCOUNT_ATTRS: [&str; 8] = [
    "sAMAccountName",
    "displayName",
    "mail",
    "department",
    "userAccountControl",
    "lockoutTime",
    "lastLogon",
    "lastLogonTimestamp",
];

/// LDAP client for directory account queries.
///
/// Each call binds, searches, and unbinds; connections are not pooled
/// since lookups are batched upstream and the server sits on the same LAN.
pub struct DirectoryClient {
    server: String,
    bind_dn: String,
    bind_password: String,
    base_dn: String,
    tls_verify: bool,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl DirectoryClient {
    /// Create a new directory client from connection configuration.
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            server: config.server.clone(),
            bind_dn: config.bind_dn.clone(),
            bind_password: config.bind_password.clone(),
            base_dn: config.base_dn.clone(),
            tls_verify: config.tls_verify,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        }
    }

    /// Return the configured base DN.
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    async fn connect(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new()
            .set_no_tls_verify(!self.tls_verify)
            .set_conn_timeout(self.connect_timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.server)
            .await
            .map_err(|e| VigiaError::Directory(format!("LDAP connect failed: {e}")))?;

        ldap3::drive!(conn);

        ldap.with_timeout(self.operation_timeout)
            .simple_bind(&self.bind_dn, &self.bind_password)
            .await
            .map_err(|e| VigiaError::Directory(format!("LDAP bind failed: {e}")))?
            .success()
            .map_err(|e| VigiaError::Directory(format!("LDAP bind rejected: {e}")))?;

        debug!(server = %self.server, "LDAP bind successful");
        Ok(ldap)
    }

    /// Test the LDAP connection by binding and unbinding.
    pub async fn test_connection(&self) -> Result<()> {
        let mut ldap = self.connect().await?;
        ldap.unbind()
            .await
            .map_err(|e| VigiaError::Directory(format!("LDAP unbind failed: {e}")))?;
        Ok(())
    }

    /// Look up a single account by login (`sAMAccountName`).
    ///
    /// Returns `DirectoryAccountStatus::not_found()` when the search
    /// succeeds but matches nothing; errors are returned only for
    /// connection or protocol failures.
    pub async fn lookup_account(&self, login: &str) -> Result<DirectoryAccountStatus> {
        let mut ldap = self.connect().await?;
        let filter = format!(
            "(&(objectClass=user)(sAMAccountName={}))",
            ldap_escape(login)
        );

        let (results, _) = ldap
            .with_timeout(self.operation_timeout)
            .search(&self.base_dn, Scope::Subtree, &filter, ACCOUNT_ATTRS.to_vec())
            .await
            .map_err(|e| VigiaError::Directory(format!("LDAP search failed: {e}")))?
            .success()
            .map_err(|e| VigiaError::Directory(format!("LDAP search error: {e}")))?;

        ldap.unbind().await.ok();

        let status = match results.into_iter().next() {
            Some(entry) => entry_to_status(SearchEntry::construct(entry)),
            None => DirectoryAccountStatus::not_found(),
        };

        debug!(login = %login, exists = status.exists, "directory lookup");
        Ok(status)
    }
}

/// Build an account status out of a raw search entry.
fn entry_to_status(entry: SearchEntry) -> DirectoryAccountStatus {
    let account_control: u32 = first_attr(&entry, "userAccountControl")
        .parse()
        .unwrap_or(0);
    let last_logon = newest_timestamp(&entry);

    DirectoryAccountStatus {
        exists: true,
        account_control,
        lockout_time: optional_attr(&entry, "lockoutTime"),
        last_logon,
        display_name: optional_attr(&entry, "displayName"),
        email: optional_attr(&entry, "mail"),
        department: optional_attr(&entry, "department"),
    }
}

/// Pick the most recent of `lastLogon` and `lastLogonTimestamp`.
///
/// `lastLogon` is per-DC and fresh, `lastLogonTimestamp` is replicated
/// but lags by up to two weeks; the max of the two is the best estimate.
fn newest_timestamp(entry: &SearchEntry) -> Option<i64> {
    let last_logon = parse_ticks(optional_attr(entry, "lastLogon"));
    let replicated = parse_ticks(optional_attr(entry, "lastLogonTimestamp"));
    match (last_logon, replicated) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn parse_ticks(value: Option<String>) -> Option<i64> {
    value.and_then(|v| v.parse::<i64>().ok()).filter(|t| *t > 0)
}

/// Extract the first value of an attribute, returning empty string if missing.
fn first_attr(entry: &SearchEntry, attr: &str) -> String {
    entry
        .attrs
        .get(attr)
        .and_then(|v| v.first())
        .cloned()
        .unwrap_or_default()
}

/// Extract the first value of an attribute as Option.
fn optional_attr(entry: &SearchEntry, attr: &str) -> Option<String> {
    entry.attrs.get(attr).and_then(|v| v.first()).cloned()
}
