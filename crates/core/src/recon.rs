//! Snapshot Reconciler — diffs two monthly HR snapshots to classify
//! exonerated and transferred employees.
//!
//! Pure: operates on two already-fetched lists, no I/O. Callers verify the
//! named tables exist before fetching; empty lists are valid inputs.

use std::collections::HashMap;

use tracing::debug;

use crate::models::snapshot::{
    EmployeeSnapshotRecord, ReconciliationResult, Transfer, UNIT_NOT_FOUND,
};
use crate::normalize::is_transfer_marker;

/// Reconcile a previous snapshot against the current one.
///
/// Exonerated: present in `previous`, absent (by employee number) from
/// `current`. Transferred: `current` records whose movement marker matches,
/// annotated with the unit they held in `previous` (or a sentinel when the
/// employee did not occur there).
///
/// Deterministic and O(n + m); output order follows input order.
pub fn reconcile(
    current: &[EmployeeSnapshotRecord],
    previous: &[EmployeeSnapshotRecord],
) -> ReconciliationResult {
    let current_index: HashMap<&str, &EmployeeSnapshotRecord> = current
        .iter()
        .map(|r| (r.employee_number.as_str(), r))
        .collect();
    let previous_index: HashMap<&str, &EmployeeSnapshotRecord> = previous
        .iter()
        .map(|r| (r.employee_number.as_str(), r))
        .collect();

    let exonerated: Vec<EmployeeSnapshotRecord> = previous
        .iter()
        .filter(|r| !current_index.contains_key(r.employee_number.as_str()))
        .cloned()
        .collect();

    let transferred: Vec<Transfer> = current
        .iter()
        .filter(|r| {
            r.movement_type
                .as_deref()
                .is_some_and(is_transfer_marker)
        })
        .map(|r| {
            let previous_unit = previous_index
                .get(r.employee_number.as_str())
                .map(|p| p.unit_label())
                .unwrap_or_else(|| UNIT_NOT_FOUND.to_string());
            Transfer {
                employee: r.clone(),
                previous_unit,
                current_unit: r.unit_label(),
            }
        })
        .collect();

    debug!(
        exonerated = exonerated.len(),
        transferred = transferred.len(),
        current = current.len(),
        previous = previous.len(),
        "snapshot reconciliation complete"
    );

    ReconciliationResult {
        exonerated,
        transferred,
    }
}
