//! Reconciliation of provider result rows against local identity records.

use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::record_queries;
use crate::models::record::{IdentityRecord, RecordStatus};
use crate::services::artifact::SotResultRow;

/// Counters produced by one reconciliation pass.
///
/// Every requested record counts as processed whether or not the provider
/// returned a matching row, so `processed == total` and
/// `failed == total - succeeded` always hold here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub total: i32,
    pub processed: i32,
    pub succeeded: i32,
    pub failed: i32,
}

impl ReconcileSummary {
    pub fn from_counts(total: usize, succeeded: usize) -> Self {
        let total = total as i32;
        let succeeded = succeeded as i32;
        Self {
            total,
            processed: total,
            succeeded,
            failed: total - succeeded,
        }
    }
}

/// Overwrite a record with provider truth and move it to grade validation.
///
/// Fields the row does not carry (or failed to parse) are left as they were.
pub fn apply_row(record: &mut IdentityRecord, row: &SotResultRow, department_id: Option<Uuid>) {
    let full_name = row.full_name();
    if !full_name.is_empty() {
        record.full_name = full_name;
    }
    if row.grade_level.is_some() {
        record.grade_level = row.grade_level.clone();
    }
    if department_id.is_some() {
        record.department_id = department_id;
    }
    if row.cadre.is_some() {
        record.cadre = row.cadre.clone();
    }
    if row.on_transfer.is_some() {
        record.on_transfer = row.on_transfer;
    }
    if row.date_of_first_appointment.is_some() {
        record.date_of_first_appointment = row.date_of_first_appointment;
    }
    if row.date_of_confirmation.is_some() {
        record.date_of_confirmation = row.date_of_confirmation;
    }
    if row.bvn.is_some() {
        record.bvn = row.bvn.clone();
    }

    record.sot_data = serde_json::to_value(&row.raw).ok();
    record.status = RecordStatus::PendingGradeValidation;
    record.verified_at = Some(chrono::Utc::now());
}

/// Match decoded rows to the job's record batch by correlation key and
/// persist each matched record individually.
///
/// Rows with no local counterpart are skipped; they reduce the match rate
/// but never fail the job. Departments are resolved find-or-create against
/// the tenant's name index, cached for the duration of the pass.
pub async fn reconcile(
    pool: &PgPool,
    tenant_id: Uuid,
    records: Vec<IdentityRecord>,
    rows: &[SotResultRow],
) -> Result<ReconcileSummary, sqlx::Error> {
    let total = records.len();
    let mut by_psn: HashMap<String, IdentityRecord> = records
        .into_iter()
        .map(|record| (record.psn.clone(), record))
        .collect();

    let mut departments: HashMap<String, Uuid> = HashMap::new();
    let mut succeeded = 0usize;
    let mut unmatched = 0usize;

    for row in rows {
        let Some(mut record) = by_psn.remove(&row.psn) else {
            debug!(psn = %row.psn, "no local record for result row, skipping");
            unmatched += 1;
            continue;
        };

        let department_id = match &row.state_ministry {
            Some(name) => {
                let id = match departments.get(name) {
                    Some(id) => *id,
                    None => {
                        let id =
                            record_queries::find_or_create_department(pool, tenant_id, name).await?;
                        departments.insert(name.clone(), id);
                        id
                    }
                };
                Some(id)
            }
            None => record.department_id,
        };

        apply_row(&mut record, row, department_id);
        record_queries::apply_sot_update(pool, &record).await?;
        succeeded += 1;
    }

    metrics::counter!("records_reconciled_total").increment(succeeded as u64);
    metrics::counter!("records_unmatched_total").increment(unmatched as u64);

    let summary = ReconcileSummary::from_counts(total, succeeded);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        unmatched_rows = unmatched,
        "reconciliation pass complete"
    );
    Ok(summary)
}
