use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::job::{BulkJob, JobStatus};
use crate::services::reconcile::ReconcileSummary;

fn map_job(row: &PgRow) -> Result<BulkJob, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(BulkJob {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        initiated_by: row.try_get("initiated_by")?,
        external_job_id: row.try_get("external_job_id")?,
        status: status.parse().unwrap_or(JobStatus::Pending),
        status_message: row.try_get("status_message")?,
        total_records: row.try_get("total_records")?,
        processed_records: row.try_get("processed_records")?,
        succeeded_records: row.try_get("succeeded_records")?,
        failed_records: row.try_get("failed_records")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new job in PENDING with its batch size.
pub async fn create_job(
    pool: &PgPool,
    tenant_id: Uuid,
    initiated_by: Uuid,
    total_records: i32,
) -> Result<BulkJob, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO bulk_verification_jobs (tenant_id, initiated_by, status, total_records)
        VALUES ($1, $2, 'PENDING', $3)
        RETURNING id, tenant_id, initiated_by, external_job_id, status, status_message,
                  total_records, processed_records, succeeded_records, failed_records,
                  created_at, updated_at
        "#,
    )
    .bind(tenant_id)
    .bind(initiated_by)
    .bind(total_records)
    .fetch_one(pool)
    .await?;

    map_job(&row)
}

/// Get a job by id, scoped to its owning tenant.
pub async fn get_job_for_tenant(
    pool: &PgPool,
    job_id: Uuid,
    tenant_id: Uuid,
) -> Result<Option<BulkJob>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, tenant_id, initiated_by, external_job_id, status, status_message,
               total_records, processed_records, succeeded_records, failed_records,
               created_at, updated_at
        FROM bulk_verification_jobs
        WHERE id = $1 AND tenant_id = $2
        "#,
    )
    .bind(job_id)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_job).transpose()
}

/// Job history for a tenant, newest first.
pub async fn list_jobs_for_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Vec<BulkJob>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, tenant_id, initiated_by, external_job_id, status, status_message,
               total_records, processed_records, succeeded_records, failed_records,
               created_at, updated_at
        FROM bulk_verification_jobs
        WHERE tenant_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_job).collect()
}

/// Transition a job to RUNNING.
pub async fn mark_running(pool: &PgPool, job_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bulk_verification_jobs
        SET status = 'RUNNING', updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record the provider-assigned job id once submission succeeds.
pub async fn set_external_job_id(
    pool: &PgPool,
    job_id: Uuid,
    external_job_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bulk_verification_jobs
        SET external_job_id = $1, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(external_job_id)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Terminal success: COMPLETED with final counters.
pub async fn complete_job(
    pool: &PgPool,
    job_id: Uuid,
    summary: &ReconcileSummary,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bulk_verification_jobs
        SET status = 'COMPLETED',
            status_message = 'Bulk verification completed successfully.',
            processed_records = $1,
            succeeded_records = $2,
            failed_records = $3,
            updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(summary.processed)
    .bind(summary.succeeded)
    .bind(summary.failed)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Terminal failure: FAILED with the causal error text. Counters are left
/// at whatever partial progress was already persisted.
pub async fn fail_job(pool: &PgPool, job_id: Uuid, message: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bulk_verification_jobs
        SET status = 'FAILED', status_message = $1, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(message)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}
