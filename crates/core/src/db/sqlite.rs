use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::error::Result;
use crate::models::{
    audit::{AdminSession, AuditEntry},
    directory::{LdapStatus, SguStatus},
    inactive::{InactiveComputer, InactiveStatus, InactiveUser},
    ticket::{Ticket, TicketStatus},
};

use super::repository::{
    AdminSessionRepository, AuditRepository, InactiveComputerRepository, InactiveUserRepository,
    TicketFilter, TicketRepository, VigiaRepository,
};

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl VigiaRepository for SqliteRepository {}

// -- Helper functions for parsing enums and dates from DB strings --

fn parse_datetime(s: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            // only this code writes these columns, so a bad value means
            // someone edited the database by hand
            warn!(value = %s, error = %e, "unparsable stored timestamp, substituting now");
            Utc::now()
        }
    }
}

fn datetime_to_str(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_inactive_status(s: &str) -> InactiveStatus {
    InactiveStatus::parse(s).unwrap_or(InactiveStatus::Pendente)
}

fn parse_ticket_status(s: &str) -> TicketStatus {
    TicketStatus::parse(s).unwrap_or(TicketStatus::Pendente)
}

fn row_to_ticket(r: &sqlx::sqlite::SqliteRow) -> Ticket {
    Ticket {
        username: r.get("username"),
        display_name: r.get("display_name"),
        email: r.get("email"),
        department_ldap: r.get("department_ldap"),
        department_sgu: r.get("department_sgu"),
        status_ldap: LdapStatus::parse(r.get("status_ldap")),
        status_sgu: SguStatus::parse(r.get("status_sgu")),
        status_ticket: parse_ticket_status(r.get("status_ticket")),
        acao: r.get("acao"),
        fechado: r.get("fechado"),
        days_inactive: r.get("days_inactive"),
        criado_por: r.get("criado_por"),
        alterado_por: r.get("alterado_por"),
        created_at: parse_datetime(r.get("created_at")),
        updated_at: parse_datetime(r.get("updated_at")),
    }
}

fn row_to_inactive_user(r: &sqlx::sqlite::SqliteRow) -> InactiveUser {
    InactiveUser {
        username: r.get("username"),
        display_name: r.get("display_name"),
        days_inactive: r.get("days_inactive"),
        last_logon: r
            .get::<Option<String>, _>("last_logon")
            .map(|s| parse_datetime(&s)),
        status: parse_inactive_status(r.get("status")),
        alterado_por: r.get("alterado_por"),
        updated_at: parse_datetime(r.get("updated_at")),
    }
}

fn row_to_inactive_computer(r: &sqlx::sqlite::SqliteRow) -> InactiveComputer {
    InactiveComputer {
        name: r.get("name"),
        operating_system: r.get("operating_system"),
        days_inactive: r.get("days_inactive"),
        last_logon: r
            .get::<Option<String>, _>("last_logon")
            .map(|s| parse_datetime(&s)),
        status: parse_inactive_status(r.get("status")),
        alterado_por: r.get("alterado_por"),
        updated_at: parse_datetime(r.get("updated_at")),
    }
}

// -- TicketRepository --

#[async_trait]
impl TicketRepository for SqliteRepository {
    async fn upsert_ticket(&self, ticket: &Ticket) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO tickets
             (username, display_name, email, department_ldap, department_sgu,
              status_ldap, status_sgu, status_ticket, acao, fechado,
              days_inactive, criado_por, alterado_por, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&ticket.username)
        .bind(&ticket.display_name)
        .bind(&ticket.email)
        .bind(&ticket.department_ldap)
        .bind(&ticket.department_sgu)
        .bind(ticket.status_ldap.as_str())
        .bind(ticket.status_sgu.as_str())
        .bind(ticket.status_ticket.as_str())
        .bind(&ticket.acao)
        .bind(ticket.fechado)
        .bind(ticket.days_inactive)
        .bind(&ticket.criado_por)
        .bind(&ticket.alterado_por)
        .bind(datetime_to_str(&ticket.created_at))
        .bind(datetime_to_str(&ticket.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_ticket(&self, username: &str) -> Result<Option<Ticket>> {
        let row = sqlx::query("SELECT * FROM tickets WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_ticket))
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let rows = sqlx::query("SELECT * FROM tickets ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        let tickets = rows
            .iter()
            .map(row_to_ticket)
            .filter(|t| {
                filter
                    .status_ticket
                    .map_or(true, |st| t.status_ticket == st)
                    && filter.fechado.map_or(true, |f| t.fechado == f)
            })
            .collect();
        Ok(tickets)
    }

    async fn delete_ticket(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// -- InactiveUserRepository --

#[async_trait]
impl InactiveUserRepository for SqliteRepository {
    async fn upsert_inactive_user(&self, user: &InactiveUser) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO inactive_users
             (username, display_name, days_inactive, last_logon, status, alterado_por, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(user.days_inactive)
        .bind(user.last_logon.as_ref().map(datetime_to_str))
        .bind(user.status.as_str())
        .bind(&user.alterado_por)
        .bind(datetime_to_str(&user.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_inactive_user(&self, username: &str) -> Result<Option<InactiveUser>> {
        let row = sqlx::query("SELECT * FROM inactive_users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_inactive_user))
    }

    async fn list_inactive_users(&self) -> Result<Vec<InactiveUser>> {
        let rows = sqlx::query("SELECT * FROM inactive_users ORDER BY days_inactive DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_inactive_user).collect())
    }

    async fn set_inactive_user_status(
        &self,
        username: &str,
        status: InactiveStatus,
        actor: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE inactive_users SET status = ?1, alterado_por = ?2, updated_at = ?3
             WHERE username = ?4",
        )
        .bind(status.as_str())
        .bind(actor)
        .bind(datetime_to_str(&Utc::now()))
        .bind(username)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_inactive_user(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inactive_users WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// -- InactiveComputerRepository --

#[async_trait]
impl InactiveComputerRepository for SqliteRepository {
    async fn upsert_inactive_computer(&self, computer: &InactiveComputer) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO inactive_computers
             (name, operating_system, days_inactive, last_logon, status, alterado_por, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&computer.name)
        .bind(&computer.operating_system)
        .bind(computer.days_inactive)
        .bind(computer.last_logon.as_ref().map(datetime_to_str))
        .bind(computer.status.as_str())
        .bind(&computer.alterado_por)
        .bind(datetime_to_str(&computer.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_inactive_computer(&self, name: &str) -> Result<Option<InactiveComputer>> {
        let row = sqlx::query("SELECT * FROM inactive_computers WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_inactive_computer))
    }

    async fn list_inactive_computers(&self) -> Result<Vec<InactiveComputer>> {
        let rows = sqlx::query("SELECT * FROM inactive_computers ORDER BY days_inactive DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_inactive_computer).collect())
    }

    async fn set_inactive_computer_status(
        &self,
        name: &str,
        status: InactiveStatus,
        actor: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE inactive_computers SET status = ?1, alterado_por = ?2, updated_at = ?3
             WHERE name = ?4",
        )
        .bind(status.as_str())
        .bind(actor)
        .bind(datetime_to_str(&Utc::now()))
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_inactive_computer(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inactive_computers WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// -- AdminSessionRepository --

#[async_trait]
impl AdminSessionRepository for SqliteRepository {
    async fn create_admin_session(&self, session: &AdminSession) -> Result<()> {
        sqlx::query(
            "INSERT INTO admin_sessions (token, created_at, expires_at, ip_address)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&session.token)
        .bind(datetime_to_str(&session.created_at))
        .bind(datetime_to_str(&session.expires_at))
        .bind(&session.ip_address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_admin_session(&self, token: &str) -> Result<Option<AdminSession>> {
        let row = sqlx::query("SELECT * FROM admin_sessions WHERE token = ?1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| AdminSession {
            token: r.get("token"),
            created_at: parse_datetime(r.get("created_at")),
            expires_at: parse_datetime(r.get("expires_at")),
            ip_address: r.get("ip_address"),
        }))
    }

    async fn delete_admin_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_admin_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at < ?1")
            .bind(datetime_to_str(&Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// -- AuditRepository --

#[async_trait]
impl AuditRepository for SqliteRepository {
    async fn log_action(
        &self,
        action: &str,
        details: Option<&str>,
        ip: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO audit_log (action, details, ip_address, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(action)
        .bind(details)
        .bind(ip)
        .bind(datetime_to_str(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query("SELECT * FROM audit_log ORDER BY id DESC LIMIT ?1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| AuditEntry {
                id: r.get("id"),
                action: r.get("action"),
                details: r.get("details"),
                ip_address: r.get("ip_address"),
                created_at: parse_datetime(r.get("created_at")),
            })
            .collect())
    }
}
