//! HR snapshot models — one row per employee per monthly reporting period.

use serde::{Deserialize, Serialize};

/// Placeholder unit name used when a transferred employee's previous unit
/// cannot be resolved from the previous snapshot.
pub const UNIT_NOT_FOUND: &str = "UNIDADE NAO ENCONTRADA";

/// One row from a dated HR snapshot table, already joined against the
/// organizational-unit lookup table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeSnapshotRecord {
    /// Stable identifier across periods; the reconciliation key.
    pub employee_number: String,
    pub full_name: String,
    pub unit_id: String,
    /// Absent when the unit lookup table has no matching row.
    pub unit_abbreviation: Option<String>,
    pub unit_name: Option<String>,
    /// Movement marker, e.g. "REMOCAO"; inconsistently cased and accented
    /// upstream.
    pub movement_type: Option<String>,
}

impl EmployeeSnapshotRecord {
    /// Human-readable unit label, preferring the abbreviation.
    pub fn unit_label(&self) -> String {
        self.unit_abbreviation
            .clone()
            .or_else(|| self.unit_name.clone())
            .unwrap_or_else(|| UNIT_NOT_FOUND.to_string())
    }
}

/// A transfer detected between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transfer {
    pub employee: EmployeeSnapshotRecord,
    pub previous_unit: String,
    pub current_unit: String,
}

/// Result of reconciling a previous snapshot against a current one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationResult {
    pub exonerated: Vec<EmployeeSnapshotRecord>,
    pub transferred: Vec<Transfer>,
}

impl ReconciliationResult {
    pub fn exonerated_count(&self) -> usize {
        self.exonerated.len()
    }

    pub fn transferred_count(&self) -> usize {
        self.transferred.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: &str) -> EmployeeSnapshotRecord {
        EmployeeSnapshotRecord {
            employee_number: number.to_string(),
            full_name: "Maria Silva".to_string(),
            unit_id: "42".to_string(),
            unit_abbreviation: Some("DTI".to_string()),
            unit_name: Some("Diretoria de TI".to_string()),
            movement_type: None,
        }
    }

    #[test]
    fn unit_label_prefers_abbreviation() {
        assert_eq!(record("100").unit_label(), "DTI");
    }

    #[test]
    fn unit_label_falls_back_to_name() {
        let mut r = record("100");
        r.unit_abbreviation = None;
        assert_eq!(r.unit_label(), "Diretoria de TI");
    }

    #[test]
    fn unit_label_sentinel_when_join_missed() {
        let mut r = record("100");
        r.unit_abbreviation = None;
        r.unit_name = None;
        assert_eq!(r.unit_label(), UNIT_NOT_FOUND);
    }

    #[test]
    fn result_counts() {
        let result = ReconciliationResult {
            exonerated: vec![record("1"), record("2")],
            transferred: vec![Transfer {
                employee: record("3"),
                previous_unit: "DTI".into(),
                current_unit: "DGP".into(),
            }],
        };
        assert_eq!(result.exonerated_count(), 2);
        assert_eq!(result.transferred_count(), 1);
    }

    #[test]
    fn record_round_trip() {
        let r = record("12345");
        let json = serde_json::to_string(&r).unwrap();
        let back: EmployeeSnapshotRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
