//! Identity resolver: merges directory, SGU, and local ticket state.
//!
//! Resolution is deliberately forgiving about upstream outages. A dead
//! LDAP server or an unreachable SGU database degrades the answer to
//! "not found" for that source instead of failing the whole request;
//! only local store failures surface as errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use vigia_core::db::repository::VigiaRepository;
use vigia_core::error::Result;
use vigia_core::ldap_time;
use vigia_core::models::directory::{DirectoryAccountStatus, SguLoginRecord, SguStatus};
use vigia_core::models::ticket::{ResolvedIdentity, Ticket};
use vigia_core::sgu::SguClient;

use crate::client::DirectoryClient;

/// Logins resolved concurrently per batch slice.
const BATCH_CHUNK_SIZE: usize = 5;
/// Pause between slices so the domain controller is not hammered.
const BATCH_PAUSE: Duration = Duration::from_millis(200);

/// Read side of the directory, abstracted for testing.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn lookup_account(&self, login: &str) -> Result<DirectoryAccountStatus>;
}

#[async_trait]
impl DirectoryLookup for DirectoryClient {
    async fn lookup_account(&self, login: &str) -> Result<DirectoryAccountStatus> {
        DirectoryClient::lookup_account(self, login).await
    }
}

/// SGU login lookup, abstracted for testing.
#[async_trait]
pub trait UnitLookup: Send + Sync {
    async fn unit_for_login(&self, login: &str) -> Result<Option<SguLoginRecord>>;
}

#[async_trait]
impl UnitLookup for SguClient {
    async fn unit_for_login(&self, login: &str) -> Result<Option<SguLoginRecord>> {
        SguClient::unit_for_login(self, login).await
    }
}

/// Result of one login inside a batch. Exactly one of `ticket` and
/// `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub username: String,
    pub ticket: Option<Ticket>,
    pub error: Option<String>,
}

/// Summary of a batch resolution run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ResolveOutcome>,
    pub resolved: i64,
    pub errors: i64,
}

/// Identity resolver over a ticket repository and two upstream sources.
pub struct Resolver<R, D, U>
where
    R: VigiaRepository,
    D: DirectoryLookup,
    U: UnitLookup,
{
    repo: Arc<R>,
    directory: D,
    sgu: U,
}

impl<R, D, U> Resolver<R, D, U>
where
    R: VigiaRepository,
    D: DirectoryLookup,
    U: UnitLookup,
{
    /// Create a new resolver.
    pub fn new(repo: Arc<R>, directory: D, sgu: U) -> Self {
        Self {
            repo,
            directory,
            sgu,
        }
    }

    /// Resolve one login against the directory and SGU.
    ///
    /// Never fails: source outages are logged and reported as the
    /// corresponding "not found" status.
    pub async fn resolve_identity(&self, login: &str) -> ResolvedIdentity {
        let account = match self.directory.lookup_account(login).await {
            Ok(account) => account,
            Err(e) => {
                warn!(login = %login, error = %e, "directory lookup failed, treating as not found");
                DirectoryAccountStatus::not_found()
            }
        };

        let hr_record = match self.sgu.unit_for_login(login).await {
            Ok(record) => record,
            Err(e) => {
                warn!(login = %login, error = %e, "SGU lookup failed, treating as not found");
                None
            }
        };

        // known login with an unresolved unit is still ENCONTRADO
        let status_sgu = if hr_record.is_some() {
            SguStatus::Encontrado
        } else {
            SguStatus::NaoEncontrado
        };
        let unit = hr_record.and_then(|r| r.unit);

        ResolvedIdentity {
            username: login.to_string(),
            display_name: account.display_name.clone(),
            email: account.email.clone(),
            department_ldap: account.department.clone(),
            department_sgu: unit,
            status_ldap: account.status(),
            status_sgu,
            days_inactive: ldap_time::days_inactive_from_ticks(account.last_logon, Utc::now()),
        }
    }

    /// Resolve one login and persist the result as a ticket.
    ///
    /// An existing ticket is merged so analyst decisions survive; a new
    /// login gets a fresh PENDENTE ticket. Store failures propagate.
    pub async fn resolve_and_record(&self, login: &str, actor: &str) -> Result<Ticket> {
        let identity = self.resolve_identity(login).await;
        let now = Utc::now();

        let ticket = match self.repo.get_ticket(login).await? {
            Some(existing) => existing.merge_resolution(&identity, actor, now),
            None => Ticket::from_resolution(&identity, actor, now),
        };
        self.repo.upsert_ticket(&ticket).await?;
        Ok(ticket)
    }

    /// Resolve a batch of logins, [`BATCH_CHUNK_SIZE`] at a time with a
    /// short pause between slices. Failures are recorded per login and
    /// never abort the batch.
    pub async fn resolve_batch(&self, logins: &[String], actor: &str) -> BatchReport {
        let mut outcomes = Vec::with_capacity(logins.len());
        let mut errors = 0i64;

        for (i, chunk) in logins.chunks(BATCH_CHUNK_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(BATCH_PAUSE).await;
            }

            let results = join_all(
                chunk
                    .iter()
                    .map(|login| self.resolve_and_record(login, actor)),
            )
            .await;

            for (login, result) in chunk.iter().zip(results) {
                match result {
                    Ok(ticket) => outcomes.push(ResolveOutcome {
                        username: login.clone(),
                        ticket: Some(ticket),
                        error: None,
                    }),
                    Err(e) => {
                        warn!(login = %login, error = %e, "batch resolution failed for login");
                        errors += 1;
                        outcomes.push(ResolveOutcome {
                            username: login.clone(),
                            ticket: None,
                            error: Some(e.to_string()),
                        });
                    }
                }
            }
        }

        let resolved = outcomes.len() as i64 - errors;
        info!(total = logins.len(), resolved, errors, "batch resolution finished");

        BatchReport {
            outcomes,
            resolved,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use vigia_core::db::repository::{
        AdminSessionRepository, AuditRepository, InactiveComputerRepository,
        InactiveUserRepository, TicketFilter, TicketRepository,
    };
    use vigia_core::error::VigiaError;
    use vigia_core::models::audit::{AdminSession, AuditEntry};
    use vigia_core::models::directory::LdapStatus;
    use vigia_core::models::inactive::{InactiveComputer, InactiveStatus, InactiveUser};
    use vigia_core::models::ticket::{TicketStatus, DAYS_INACTIVE_NEVER};

    #[derive(Default)]
    struct MockRepo {
        tickets: Mutex<HashMap<String, Ticket>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl TicketRepository for MockRepo {
        async fn upsert_ticket(&self, ticket: &Ticket) -> Result<()> {
            if self.fail_writes {
                return Err(VigiaError::Validation("store unavailable".into()));
            }
            self.tickets
                .lock()
                .unwrap()
                .insert(ticket.username.clone(), ticket.clone());
            Ok(())
        }

        async fn get_ticket(&self, username: &str) -> Result<Option<Ticket>> {
            Ok(self.tickets.lock().unwrap().get(username).cloned())
        }

        async fn list_tickets(&self, _filter: &TicketFilter) -> Result<Vec<Ticket>> {
            Ok(self.tickets.lock().unwrap().values().cloned().collect())
        }

        async fn delete_ticket(&self, username: &str) -> Result<bool> {
            Ok(self.tickets.lock().unwrap().remove(username).is_some())
        }
    }

    #[async_trait]
    impl InactiveUserRepository for MockRepo {
        async fn upsert_inactive_user(&self, _user: &InactiveUser) -> Result<()> {
            Ok(())
        }
        async fn get_inactive_user(&self, _username: &str) -> Result<Option<InactiveUser>> {
            Ok(None)
        }
        async fn list_inactive_users(&self) -> Result<Vec<InactiveUser>> {
            Ok(vec![])
        }
        async fn set_inactive_user_status(
            &self,
            _username: &str,
            _status: InactiveStatus,
            _actor: &str,
        ) -> Result<bool> {
            Ok(false)
        }
        async fn delete_inactive_user(&self, _username: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl InactiveComputerRepository for MockRepo {
        async fn upsert_inactive_computer(&self, _computer: &InactiveComputer) -> Result<()> {
            Ok(())
        }
        async fn get_inactive_computer(&self, _name: &str) -> Result<Option<InactiveComputer>> {
            Ok(None)
        }
        async fn list_inactive_computers(&self) -> Result<Vec<InactiveComputer>> {
            Ok(vec![])
        }
        async fn set_inactive_computer_status(
            &self,
            _name: &str,
            _status: InactiveStatus,
            _actor: &str,
        ) -> Result<bool> {
            Ok(false)
        }
        async fn delete_inactive_computer(&self, _name: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl AdminSessionRepository for MockRepo {
        async fn create_admin_session(&self, _session: &AdminSession) -> Result<()> {
            Ok(())
        }
        async fn get_admin_session(&self, _token: &str) -> Result<Option<AdminSession>> {
            Ok(None)
        }
        async fn delete_admin_session(&self, _token: &str) -> Result<bool> {
            Ok(false)
        }
        async fn delete_expired_admin_sessions(&self) -> Result<u64> {
            Ok(0)
        }
    }

    #[async_trait]
    impl AuditRepository for MockRepo {
        async fn log_action(
            &self,
            _action: &str,
            _details: Option<&str>,
            _ip: Option<&str>,
        ) -> Result<i64> {
            Ok(1)
        }
        async fn list_audit_log(&self, _limit: i64) -> Result<Vec<AuditEntry>> {
            Ok(vec![])
        }
    }

    impl VigiaRepository for MockRepo {}

    /// Directory stub keyed by login; unknown logins count as not found,
    /// logins listed in `failing` simulate a dead server.
    #[derive(Default)]
    struct MockDirectory {
        accounts: HashMap<String, DirectoryAccountStatus>,
        failing: bool,
    }

    #[async_trait]
    impl DirectoryLookup for MockDirectory {
        async fn lookup_account(&self, login: &str) -> Result<DirectoryAccountStatus> {
            if self.failing {
                return Err(VigiaError::Directory("connection refused".into()));
            }
            Ok(self
                .accounts
                .get(login)
                .cloned()
                .unwrap_or_else(DirectoryAccountStatus::not_found))
        }
    }

    /// HR stub keyed by login; the value is the resolved unit, `None`
    /// modelling a known login whose unit id has no org-chart row.
    #[derive(Default)]
    struct MockUnits {
        logins: HashMap<String, Option<String>>,
        failing: bool,
    }

    #[async_trait]
    impl UnitLookup for MockUnits {
        async fn unit_for_login(&self, login: &str) -> Result<Option<SguLoginRecord>> {
            if self.failing {
                return Err(VigiaError::Sgu("connection refused".into()));
            }
            Ok(self
                .logins
                .get(login)
                .map(|unit| SguLoginRecord { unit: unit.clone() }))
        }
    }

    fn active_account(display: &str, dept: &str) -> DirectoryAccountStatus {
        DirectoryAccountStatus {
            exists: true,
            account_control: 512,
            lockout_time: Some("0".to_string()),
            // recent-ish logon, well before now
            last_logon: Some(132_223_104_000_000_000),
            display_name: Some(display.to_string()),
            email: Some(format!("{display}@corp.local")),
            department: Some(dept.to_string()),
        }
    }

    fn resolver_with(
        repo: Arc<MockRepo>,
        directory: MockDirectory,
        units: MockUnits,
    ) -> Resolver<MockRepo, MockDirectory, MockUnits> {
        Resolver::new(repo, directory, units)
    }

    #[tokio::test]
    async fn resolves_known_login_from_both_sources() {
        let mut directory = MockDirectory::default();
        directory
            .accounts
            .insert("jsilva".to_string(), active_account("Joao Silva", "DTI"));
        let mut units = MockUnits::default();
        units
            .logins
            .insert("jsilva".to_string(), Some("DGP".to_string()));

        let resolver = resolver_with(Arc::new(MockRepo::default()), directory, units);
        let identity = resolver.resolve_identity("jsilva").await;

        assert_eq!(identity.status_ldap, LdapStatus::Ativo);
        assert_eq!(identity.status_sgu, SguStatus::Encontrado);
        assert_eq!(identity.department_ldap.as_deref(), Some("DTI"));
        assert_eq!(identity.department_sgu.as_deref(), Some("DGP"));
        assert!(identity.days_inactive > 0);
        assert_ne!(identity.days_inactive, DAYS_INACTIVE_NEVER);
    }

    #[tokio::test]
    async fn directory_outage_degrades_to_not_found() {
        let directory = MockDirectory {
            failing: true,
            ..Default::default()
        };
        let resolver = resolver_with(Arc::new(MockRepo::default()), directory, MockUnits::default());
        let identity = resolver.resolve_identity("jsilva").await;

        assert_eq!(identity.status_ldap, LdapStatus::NaoEncontrado);
        assert_eq!(identity.status_sgu, SguStatus::NaoEncontrado);
        assert_eq!(identity.days_inactive, DAYS_INACTIVE_NEVER);
        assert!(identity.display_name.is_none());
    }

    #[tokio::test]
    async fn sgu_outage_degrades_to_nao_encontrado() {
        let mut directory = MockDirectory::default();
        directory
            .accounts
            .insert("jsilva".to_string(), active_account("Joao Silva", "DTI"));
        let units = MockUnits {
            failing: true,
            ..Default::default()
        };
        let resolver = resolver_with(Arc::new(MockRepo::default()), directory, units);
        let identity = resolver.resolve_identity("jsilva").await;

        assert_eq!(identity.status_ldap, LdapStatus::Ativo);
        assert_eq!(identity.status_sgu, SguStatus::NaoEncontrado);
        assert!(identity.department_sgu.is_none());
    }

    #[tokio::test]
    async fn known_login_without_org_chart_row_is_still_encontrado() {
        let mut directory = MockDirectory::default();
        directory
            .accounts
            .insert("jsilva".to_string(), active_account("Joao Silva", "DTI"));
        let mut units = MockUnits::default();
        units.logins.insert("jsilva".to_string(), None);

        let resolver = resolver_with(Arc::new(MockRepo::default()), directory, units);
        let identity = resolver.resolve_identity("jsilva").await;

        assert_eq!(identity.status_sgu, SguStatus::Encontrado);
        assert!(identity.department_sgu.is_none());
    }

    #[tokio::test]
    async fn record_creates_then_merges_ticket() {
        let repo = Arc::new(MockRepo::default());
        let mut directory = MockDirectory::default();
        directory
            .accounts
            .insert("jsilva".to_string(), active_account("Joao Silva", "DTI"));
        let resolver = resolver_with(repo.clone(), directory, MockUnits::default());

        let first = resolver.resolve_and_record("jsilva", "analista1").await.unwrap();
        assert_eq!(first.status_ticket, TicketStatus::Pendente);

        // analyst decides, then re-resolution must not clobber the decision
        let mut decided = first.clone();
        decided.status_ticket = TicketStatus::Bloquear;
        decided.acao = Some("bloquear na sexta".to_string());
        repo.upsert_ticket(&decided).await.unwrap();

        let merged = resolver.resolve_and_record("jsilva", "sistema").await.unwrap();
        assert_eq!(merged.status_ticket, TicketStatus::Bloquear);
        assert_eq!(merged.acao.as_deref(), Some("bloquear na sexta"));
        assert_eq!(merged.criado_por, "analista1");
        assert_eq!(merged.alterado_por, "sistema");
    }

    #[tokio::test]
    async fn batch_reports_per_login_outcomes() {
        let repo = Arc::new(MockRepo::default());
        let mut directory = MockDirectory::default();
        directory
            .accounts
            .insert("jsilva".to_string(), active_account("Joao Silva", "DTI"));
        let resolver = resolver_with(repo.clone(), directory, MockUnits::default());

        let logins: Vec<String> = ["jsilva", "fantasma", "outro"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let report = resolver.resolve_batch(&logins, "analista1").await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.errors, 0);
        assert_eq!(report.resolved, 3);
        // unknown logins still get a NAO_ENCONTRADO ticket
        let ghost = repo.get_ticket("fantasma").await.unwrap().unwrap();
        assert_eq!(ghost.status_ldap, LdapStatus::NaoEncontrado);
        assert_eq!(ghost.days_inactive, DAYS_INACTIVE_NEVER);
    }

    #[tokio::test]
    async fn batch_records_store_failures_without_aborting() {
        let repo = Arc::new(MockRepo {
            fail_writes: true,
            ..Default::default()
        });
        let resolver = resolver_with(repo, MockDirectory::default(), MockUnits::default());

        let logins: Vec<String> = (0..7).map(|i| format!("user{i}")).collect();
        let report = resolver.resolve_batch(&logins, "analista1").await;

        assert_eq!(report.outcomes.len(), 7);
        assert_eq!(report.errors, 7);
        assert_eq!(report.resolved, 0);
        assert!(report.outcomes.iter().all(|o| o.error.is_some()));
        // order of the input is preserved across chunks
        assert_eq!(report.outcomes[6].username, "user6");
    }
}
