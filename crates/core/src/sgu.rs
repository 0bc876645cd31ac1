//! SGU reader — the external HR/org-chart MySQL database.
//!
//! Snapshot tables are named `<prefix>_YYYY_MM`, one per reporting period,
//! and join a stable organizational-unit lookup table by unit id. Table
//! names cannot be bound as SQL parameters, so every period string is
//! validated against the naming convention before it is interpolated.

use sqlx::mysql::MySqlPool;
use sqlx::Row;
use tracing::debug;

use crate::config::SguConfig;
use crate::error::{Result, VigiaError};
use crate::models::directory::SguLoginRecord;
use crate::models::snapshot::EmployeeSnapshotRecord;

/// Client for the SGU MySQL database.
#[derive(Clone)]
pub struct SguClient {
    pool: MySqlPool,
    snapshot_prefix: String,
    unit_table: String,
    login_table: String,
}

/// Check a period identifier against the `YYYY_MM` table-naming convention.
///
/// Rejected inputs never reach a query, which also keeps interpolated table
/// names safe.
pub fn validate_period(period: &str) -> Result<()> {
    let bytes = period.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'_'
        && bytes[5..].iter().all(u8::is_ascii_digit);
    if !well_formed {
        return Err(VigiaError::Validation(format!(
            "invalid period '{period}': expected YYYY_MM"
        )));
    }
    let month: u32 = period[5..].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(VigiaError::Validation(format!(
            "invalid period '{period}': month out of range"
        )));
    }
    Ok(())
}

impl SguClient {
    pub fn new(pool: MySqlPool, config: &SguConfig) -> Self {
        Self {
            pool,
            snapshot_prefix: config.snapshot_prefix.clone(),
            unit_table: config.unit_table.clone(),
            login_table: config.login_table.clone(),
        }
    }

    /// Connect to the SGU database described by the configuration.
    pub async fn connect(config: &SguConfig) -> Result<Self> {
        let pool = MySqlPool::connect(&config.url)
            .await
            .map_err(|e| VigiaError::Sgu(format!("SGU connect failed: {e}")))?;
        Ok(Self::new(pool, config))
    }

    /// Build a client without touching the network. Connections are opened
    /// on first use, so the portal can start while SGU is down.
    pub fn connect_lazy(config: &SguConfig) -> Result<Self> {
        let pool = MySqlPool::connect_lazy(&config.url)
            .map_err(|e| VigiaError::Sgu(format!("invalid SGU url: {e}")))?;
        Ok(Self::new(pool, config))
    }

    fn snapshot_table(&self, period: &str) -> String {
        format!("{}_{}", self.snapshot_prefix, period)
    }

    /// Whether the snapshot table for a period exists.
    pub async fn snapshot_exists(&self, period: &str) -> Result<bool> {
        validate_period(period)?;
        let table = self.snapshot_table(period);
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM information_schema.tables
             WHERE table_schema = DATABASE() AND table_name = ?",
        )
        .bind(&table)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| VigiaError::Sgu(format!("SGU table check failed: {e}")))?;
        let n: i64 = row.get("n");
        Ok(n > 0)
    }

    /// Read one dated snapshot, joined against the unit lookup table.
    pub async fn snapshot(&self, period: &str) -> Result<Vec<EmployeeSnapshotRecord>> {
        validate_period(period)?;
        let table = self.snapshot_table(period);
        let sql = format!(
            "SELECT f.matricula, f.nome, f.unidade_id, f.tipo_movimento,
                    u.sigla, u.nome AS unidade_nome
             FROM `{table}` f
             LEFT JOIN `{unit}` u ON u.id = f.unidade_id",
            unit = self.unit_table,
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| VigiaError::Sgu(format!("SGU snapshot read failed: {e}")))?;

        let records = rows
            .into_iter()
            .map(|r| EmployeeSnapshotRecord {
                employee_number: r.get("matricula"),
                full_name: r.get("nome"),
                unit_id: r.get("unidade_id"),
                unit_abbreviation: r.get("sigla"),
                unit_name: r.get("unidade_nome"),
                movement_type: r.get("tipo_movimento"),
            })
            .collect::<Vec<_>>();

        debug!(period = %period, rows = records.len(), "SGU snapshot loaded");
        Ok(records)
    }

    /// Look up a network login in the HR system. `Ok(None)` means the HR
    /// system does not know the login at all; a known login whose unit id
    /// has no org-chart row comes back with `unit: None`.
    pub async fn unit_for_login(&self, login: &str) -> Result<Option<SguLoginRecord>> {
        let sql = format!(
            "SELECT u.sigla
             FROM `{login_table}` c
             LEFT JOIN `{unit}` u ON u.id = c.unidade_id
             WHERE c.login = ?",
            login_table = self.login_table,
            unit = self.unit_table,
        );
        let row = sqlx::query(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| VigiaError::Sgu(format!("SGU login lookup failed: {e}")))?;
        Ok(row.map(|r| SguLoginRecord {
            unit: r.get("sigla"),
        }))
    }
}
