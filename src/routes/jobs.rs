use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::job_queries;
use crate::models::api::{
    BulkJobDto, StartBulkVerificationRequest, StartBulkVerificationResponse,
};
use crate::services::orchestrator;

/// Tenant scope for job queries.
#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    pub tenant_id: Uuid,
}

/// POST /api/v1/bulk-verification — start a bulk run over all of a tenant's
/// records awaiting verification. Fire-and-forget: the job runs on its own
/// task and the response only acknowledges the request.
pub async fn start_bulk_verification(
    State(state): State<AppState>,
    Json(request): Json<StartBulkVerificationRequest>,
) -> Result<(StatusCode, Json<StartBulkVerificationResponse>), StatusCode> {
    let job_id = orchestrator::start_bulk_verification(
        &state,
        request.tenant_id,
        request.initiated_by,
    )
    .await
    .map_err(|e| {
        tracing::error!(tenant_id = %request.tenant_id, error = %e, "failed to start bulk verification");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let message = match job_id {
        Some(_) => "Bulk verification started.",
        None => "No records awaiting verification; no job created.",
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(StartBulkVerificationResponse {
            job_id,
            message: message.to_string(),
        }),
    ))
}

/// GET /api/v1/bulk-jobs?tenant_id= — job history for a tenant, newest first.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<BulkJobDto>>, StatusCode> {
    let jobs = job_queries::list_jobs_for_tenant(&state.db, query.tenant_id)
        .await
        .map_err(|e| {
            tracing::error!(tenant_id = %query.tenant_id, error = %e, "failed to list jobs");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(jobs.into_iter().map(BulkJobDto::from).collect()))
}

/// GET /api/v1/bulk-jobs/{job_id}?tenant_id= — one job, scoped to its
/// owning tenant; jobs of other tenants are indistinguishable from absent.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<BulkJobDto>, StatusCode> {
    let job = job_queries::get_job_for_tenant(&state.db, job_id, query.tenant_id)
        .await
        .map_err(|e| {
            tracing::error!(%job_id, error = %e, "failed to load job");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    job.map(|job| Json(BulkJobDto::from(job)))
        .ok_or(StatusCode::NOT_FOUND)
}
