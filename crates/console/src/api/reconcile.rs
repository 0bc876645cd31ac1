//! Snapshot reconciliation endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use vigia_core::db::repository::AuditRepository;
use vigia_core::models::snapshot::ReconciliationResult;
use vigia_core::recon;
use vigia_core::sgu::validate_period;

use crate::api::{error_response, not_found};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub current_period: String,
    pub previous_period: String,
}

/// POST /api/reconcile - Compare two monthly HR snapshots.
///
/// Loads both dated snapshot tables from SGU and reports exonerated and
/// transferred employees. Nothing is persisted; the report is advisory.
pub async fn run_reconciliation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    for period in [&req.current_period, &req.previous_period] {
        if let Err(e) = validate_period(period) {
            return error_response(&e);
        }
        match state.sgu.snapshot_exists(period).await {
            Ok(true) => {}
            Ok(false) => return not_found("snapshot for period", period),
            Err(e) => return error_response(&e),
        }
    }

    let current = match state.sgu.snapshot(&req.current_period).await {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };
    let previous = match state.sgu.snapshot(&req.previous_period).await {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };

    let result = recon::reconcile(&current, &previous);
    info!(
        current = %req.current_period,
        previous = %req.previous_period,
        exonerated = result.exonerated_count(),
        transferred = result.transferred_count(),
        "reconciliation finished"
    );

    let _ = state
        .repo
        .log_action(
            "reconcile",
            Some(&format!(
                "{} vs {}: {} exonerated, {} transferred",
                req.current_period,
                req.previous_period,
                result.exonerated_count(),
                result.transferred_count()
            )),
            None,
        )
        .await;

    Json(report_body(
        &req.current_period,
        &req.previous_period,
        &result,
    ))
    .into_response()
}

fn report_body(
    current_period: &str,
    previous_period: &str,
    result: &ReconciliationResult,
) -> serde_json::Value {
    json!({
        "current_period": current_period,
        "previous_period": previous_period,
        "exonerated_count": result.exonerated_count(),
        "transferred_count": result.transferred_count(),
        "exonerated": result.exonerated,
        "transferred": result.transferred,
    })
}
