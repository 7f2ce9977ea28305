//! Bulk verification job orchestration.
//!
//! Drives one job from creation to a terminal state: submit the batch to the
//! tenant's provider, poll until the provider finishes, download and decode
//! the result artifact, reconcile rows into local records. Each job runs on
//! its own spawned task; the caller gets the job id back immediately and
//! observes progress through the job store.

use garde::Validate;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{job_queries, record_queries, tenant_queries};
use crate::models::job::BulkJob;
use crate::models::record::{IdentityRecord, RecordStatus};
use crate::models::tenant::ProviderConfig;
use crate::services::artifact::{self, ArtifactError};
use crate::services::crypto::{CryptoError, ResultCipher};
use crate::services::provider::{ProviderError, SotClient};
use crate::services::reconcile::{self, ReconcileSummary};

/// Select a tenant's records awaiting verification and start a job over
/// them. Returns `None` without creating anything when the tenant has no
/// pending records.
pub async fn start_bulk_verification(
    state: &AppState,
    tenant_id: Uuid,
    initiated_by: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    let records = record_queries::find_by_status(
        &state.db,
        tenant_id,
        RecordStatus::PendingVerification,
    )
    .await?;

    if records.is_empty() {
        info!(%tenant_id, "no records awaiting verification, no job created");
        return Ok(None);
    }

    let job =
        job_queries::create_job(&state.db, tenant_id, initiated_by, records.len() as i32).await?;
    metrics::counter!("bulk_jobs_started_total").increment(1);
    info!(
        job_id = %job.id,
        %tenant_id,
        total_records = records.len(),
        "bulk verification job created"
    );

    let job_id = job.id;
    let task_state = state.clone();
    tokio::spawn(run_job(task_state, job, records));

    Ok(Some(job_id))
}

/// Orchestration body for one job. Runs on its own task; every state
/// transition is persisted immediately and nothing propagates to the caller.
pub async fn run_job(state: AppState, job: BulkJob, records: Vec<IdentityRecord>) {
    info!(job_id = %job.id, tenant_id = %job.tenant_id, "starting background verification job");

    let persisted = match run_job_inner(&state, &job, records).await {
        Ok(summary) => {
            metrics::counter!("bulk_jobs_completed_total").increment(1);
            info!(
                job_id = %job.id,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "bulk verification job completed"
            );
            job_queries::complete_job(&state.db, job.id, &summary).await
        }
        Err(error) => {
            metrics::counter!("bulk_jobs_failed_total").increment(1);
            error!(job_id = %job.id, error = %error, "bulk verification job failed");
            job_queries::fail_job(&state.db, job.id, &format!("Job failed: {error}")).await
        }
    };

    if let Err(db_error) = persisted {
        error!(job_id = %job.id, error = %db_error, "failed to persist terminal job state");
    }
}

async fn run_job_inner(
    state: &AppState,
    job: &BulkJob,
    records: Vec<IdentityRecord>,
) -> Result<ReconcileSummary, JobError> {
    job_queries::mark_running(&state.db, job.id).await?;

    let raw_config = tenant_queries::get_provider_config(&state.db, job.tenant_id).await?;
    let config = resolve_provider_config(job.tenant_id, raw_config)?;

    if config.provider_name.eq_ignore_ascii_case("OPTIMA") {
        run_optima_batch(state, job, &config, records).await
    } else {
        Err(JobError::UnsupportedProvider(config.provider_name))
    }
}

fn resolve_provider_config(
    tenant_id: Uuid,
    raw: Option<String>,
) -> Result<ProviderConfig, JobError> {
    let raw = raw
        .filter(|json| !json.trim().is_empty())
        .ok_or_else(|| {
            JobError::Configuration(format!("no provider configured for tenant {tenant_id}"))
        })?;

    let config: ProviderConfig = serde_json::from_str(&raw)
        .map_err(|e| JobError::Configuration(format!("unparseable provider config: {e}")))?;
    config
        .validate()
        .map_err(|e| JobError::Configuration(format!("invalid provider config: {e}")))?;
    Ok(config)
}

/// The Optima batch strategy: submit, poll to a terminal provider status,
/// download, decode, reconcile.
async fn run_optima_batch(
    state: &AppState,
    job: &BulkJob,
    config: &ProviderConfig,
    records: Vec<IdentityRecord>,
) -> Result<ReconcileSummary, JobError> {
    // Key/IV problems surface before any network traffic.
    let cipher = ResultCipher::new(config.result_key.as_bytes(), config.result_iv.as_bytes())?;
    let client = state.clients.client_for(config)?;

    let psn_list: Vec<String> = records.iter().map(|r| r.psn.clone()).collect();
    let provider_job_id = client.submit_batch(&psn_list).await?;
    info!(job_id = %job.id, %provider_job_id, "batch submitted to provider");
    job_queries::set_external_job_id(&state.db, job.id, &provider_job_id).await?;

    let file_url = poll_until_terminal(&client, &provider_job_id, state.poll_interval).await?;
    info!(job_id = %job.id, "provider batch completed, downloading result artifact");

    let container = client.fetch_artifact(&file_url).await?;
    let encrypted = artifact::extract_single_entry(&container)?;
    let plaintext = cipher.decrypt(&encrypted)?;
    let rows = artifact::parse_rows(&plaintext)?;

    if rows.is_empty() {
        warn!(job_id = %job.id, "result artifact decoded to zero rows");
    }

    Ok(reconcile::reconcile(&state.db, job.tenant_id, records, &rows).await?)
}

/// Poll the provider at a fixed interval until it reports a terminal batch
/// status, returning the result artifact URL on completion.
async fn poll_until_terminal(
    client: &SotClient,
    provider_job_id: &str,
    interval: std::time::Duration,
) -> Result<String, JobError> {
    loop {
        sleep(interval).await;

        let status = client.poll_status(provider_job_id).await?;
        if status.is_failed() {
            let message = status
                .message
                .unwrap_or_else(|| "provider gave no failure message".to_string());
            return Err(ProviderError::BatchFailed(message).into());
        }
        if status.is_completed() {
            if let Some(hash) = &status.file_hash {
                debug!(%provider_job_id, artifact_hash = %hash, "provider published artifact checksum");
            }
            return status
                .file_url
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| ProviderError::MissingArtifact.into());
        }

        debug!(%provider_job_id, status = %status.status, "provider batch still in progress");
    }
}

/// Any error that terminates a job. Captured at the top of the job task and
/// written into the job's status message; callers never see it directly.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("tenant provider configuration error: {0}")]
    Configuration(String),

    #[error("bulk verification not supported for provider: {0}")]
    UnsupportedProvider(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}
