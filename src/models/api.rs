use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{BulkJob, JobStatus};

/// Request to start a bulk verification run for a tenant.
///
/// The acting identity is an explicit field rather than ambient state; the
/// authentication layer in front of this service is expected to fill it in.
#[derive(Debug, Deserialize)]
pub struct StartBulkVerificationRequest {
    pub tenant_id: Uuid,
    pub initiated_by: Uuid,
}

/// Response after requesting a bulk verification run.
///
/// `job_id` is `None` when the tenant had no records awaiting verification
/// and no job was created.
#[derive(Debug, Serialize)]
pub struct StartBulkVerificationResponse {
    pub job_id: Option<Uuid>,
    pub message: String,
}

/// External view of a bulk job, for dashboards and status polling.
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkJobDto {
    pub id: Uuid,
    pub status: JobStatus,
    pub status_message: Option<String>,
    pub external_job_id: Option<String>,
    pub total_records: i32,
    pub processed_records: i32,
    pub succeeded_records: i32,
    pub failed_records: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BulkJob> for BulkJobDto {
    fn from(job: BulkJob) -> Self {
        Self {
            id: job.id,
            status: job.status,
            status_message: job.status_message,
            external_job_id: job.external_job_id,
            total_records: job.total_records,
            processed_records: job.processed_records,
            succeeded_records: job.succeeded_records,
            failed_records: job.failed_records,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}
