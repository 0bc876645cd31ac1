use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    audit::{AdminSession, AuditEntry},
    inactive::{InactiveComputer, InactiveStatus, InactiveUser},
    ticket::{Ticket, TicketStatus},
};

/// Filter for listing tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status_ticket: Option<TicketStatus>,
    pub fechado: Option<bool>,
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert or replace the row for `ticket.username`.
    async fn upsert_ticket(&self, ticket: &Ticket) -> Result<()>;
    async fn get_ticket(&self, username: &str) -> Result<Option<Ticket>>;
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;
    async fn delete_ticket(&self, username: &str) -> Result<bool>;
}

#[async_trait]
pub trait InactiveUserRepository: Send + Sync {
    async fn upsert_inactive_user(&self, user: &InactiveUser) -> Result<()>;
    async fn get_inactive_user(&self, username: &str) -> Result<Option<InactiveUser>>;
    async fn list_inactive_users(&self) -> Result<Vec<InactiveUser>>;
    async fn set_inactive_user_status(
        &self,
        username: &str,
        status: InactiveStatus,
        actor: &str,
    ) -> Result<bool>;
    async fn delete_inactive_user(&self, username: &str) -> Result<bool>;
}

#[async_trait]
pub trait InactiveComputerRepository: Send + Sync {
    async fn upsert_inactive_computer(&self, computer: &InactiveComputer) -> Result<()>;
    async fn get_inactive_computer(&self, name: &str) -> Result<Option<InactiveComputer>>;
    async fn list_inactive_computers(&self) -> Result<Vec<InactiveComputer>>;
    async fn set_inactive_computer_status(
        &self,
        name: &str,
        status: InactiveStatus,
        actor: &str,
    ) -> Result<bool>;
    async fn delete_inactive_computer(&self, name: &str) -> Result<bool>;
}

#[async_trait]
pub trait AdminSessionRepository: Send + Sync {
    async fn create_admin_session(&self, session: &AdminSession) -> Result<()>;
    async fn get_admin_session(&self, token: &str) -> Result<Option<AdminSession>>;
    async fn delete_admin_session(&self, token: &str) -> Result<bool>;
    async fn delete_expired_admin_sessions(&self) -> Result<u64>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: Option<&str>,
        ip: Option<&str>,
    ) -> Result<i64>;
    async fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>>;
}

/// The full repository surface handlers and engines depend on.
pub trait VigiaRepository:
    TicketRepository
    + InactiveUserRepository
    + InactiveComputerRepository
    + AdminSessionRepository
    + AuditRepository
{
}
