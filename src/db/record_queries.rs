use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::record::{IdentityRecord, RecordStatus};

fn map_record(row: &PgRow) -> Result<IdentityRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(IdentityRecord {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        psn: row.try_get("psn")?,
        full_name: row.try_get("full_name")?,
        grade_level: row.try_get("grade_level")?,
        department_id: row.try_get("department_id")?,
        cadre: row.try_get("cadre")?,
        on_transfer: row.try_get("on_transfer")?,
        date_of_first_appointment: row.try_get("date_of_first_appointment")?,
        date_of_confirmation: row.try_get("date_of_confirmation")?,
        bvn: row.try_get("bvn")?,
        status: status.parse().unwrap_or(RecordStatus::PendingVerification),
        sot_data: row.try_get("sot_data")?,
        verified_at: row.try_get("verified_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// All of a tenant's records in the given workflow status.
pub async fn find_by_status(
    pool: &PgPool,
    tenant_id: Uuid,
    status: RecordStatus,
) -> Result<Vec<IdentityRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, tenant_id, psn, full_name, grade_level, department_id, cadre,
               on_transfer, date_of_first_appointment, date_of_confirmation, bvn,
               status, sot_data, verified_at, created_at, updated_at
        FROM identity_records
        WHERE tenant_id = $1 AND status = $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(tenant_id)
    .bind(status.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_record).collect()
}

/// Persist the provider-confirmed fields of one reconciled record.
pub async fn apply_sot_update(pool: &PgPool, record: &IdentityRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE identity_records
        SET full_name = $1,
            grade_level = $2,
            department_id = $3,
            cadre = $4,
            on_transfer = $5,
            date_of_first_appointment = $6,
            date_of_confirmation = $7,
            bvn = $8,
            status = $9,
            sot_data = $10,
            verified_at = $11,
            updated_at = NOW()
        WHERE id = $12
        "#,
    )
    .bind(&record.full_name)
    .bind(&record.grade_level)
    .bind(record.department_id)
    .bind(&record.cadre)
    .bind(record.on_transfer)
    .bind(record.date_of_first_appointment)
    .bind(record.date_of_confirmation)
    .bind(&record.bvn)
    .bind(record.status.to_string())
    .bind(&record.sot_data)
    .bind(record.verified_at)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve a department by tenant-scoped name, inserting it if new.
pub async fn find_or_create_department(
    pool: &PgPool,
    tenant_id: Uuid,
    name: &str,
) -> Result<Uuid, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO departments (tenant_id, name)
        VALUES ($1, $2)
        ON CONFLICT (tenant_id, name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(tenant_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    row.try_get("id")
}

/// Count a tenant's records in the given status (for job summaries).
pub async fn count_by_status(
    pool: &PgPool,
    tenant_id: Uuid,
    status: RecordStatus,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total
        FROM identity_records
        WHERE tenant_id = $1 AND status = $2
        "#,
    )
    .bind(tenant_id)
    .bind(status.to_string())
    .fetch_one(pool)
    .await?;

    row.try_get("total")
}

/// Seed one record awaiting verification (admin/test tooling; uploads are
/// handled outside this service).
pub async fn insert_pending_record(
    pool: &PgPool,
    tenant_id: Uuid,
    psn: &str,
    full_name: &str,
) -> Result<IdentityRecord, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO identity_records (tenant_id, psn, full_name, status)
        VALUES ($1, $2, $3, 'PENDING_VERIFICATION')
        RETURNING id, tenant_id, psn, full_name, grade_level, department_id, cadre,
                  on_transfer, date_of_first_appointment, date_of_confirmation, bvn,
                  status, sot_data, verified_at, created_at, updated_at
        "#,
    )
    .bind(tenant_id)
    .bind(psn)
    .bind(full_name)
    .fetch_one(pool)
    .await?;

    map_record(&row)
}
