//! Source-of-Truth batch provider client.
//!
//! Thin HTTP wrapper over the provider's bulk-inquiry API: submit a batch of
//! correlation keys, probe job status, download the result artifact. The job
//! lifecycle (poll loop, terminal-state handling) belongs to the
//! orchestrator, not this client.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::tenant::ProviderConfig;

const CLIENT_ID_HEADER: &str = "client-id";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider-reported status of a submitted batch.
#[derive(Debug, Clone)]
pub struct BatchStatus {
    pub status: String,
    pub file_url: Option<String>,
    pub file_hash: Option<String>,
    pub message: Option<String>,
}

impl BatchStatus {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("COMPLETED")
    }

    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("FAILED")
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitData {
    job_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StatusData {
    status: Option<String>,
    file_url: Option<String>,
    file_hash: Option<String>,
    message: Option<String>,
}

/// Client for one tenant's provider endpoint.
pub struct SotClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl SotClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        })
    }

    /// Submit a batch of correlation keys, returning the provider's job id.
    pub async fn submit_batch(&self, psn_list: &[String]) -> Result<String, ProviderError> {
        let url = format!("{}/bulk-inquiry", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .json(&json!({ "psnList": psn_list }))
            .send()
            .await?;

        let body: Envelope<SubmitData> = Self::read_json(response).await?;
        body.data
            .and_then(|data| data.job_id)
            .filter(|id| !id.is_empty())
            .ok_or(ProviderError::MissingJobId)
    }

    /// Probe the status of a submitted batch. Single synchronous probe; the
    /// caller owns the poll loop.
    pub async fn poll_status(&self, provider_job_id: &str) -> Result<BatchStatus, ProviderError> {
        let url = format!("{}/bulk-inquiry/{}/status", self.base_url, provider_job_id);
        let response = self
            .http
            .get(&url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .send()
            .await?;

        let body: Envelope<StatusData> = Self::read_json(response).await?;
        let data = body.data.unwrap_or_default();

        Ok(BatchStatus {
            status: data.status.unwrap_or_default(),
            file_url: data.file_url,
            file_hash: data.file_hash,
            message: data.message,
        })
    }

    /// Download the raw result container.
    pub async fn fetch_artifact(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

/// Builds and caches one [`SotClient`] per distinct provider configuration.
///
/// Per-tenant secrets arrive with each job, so clients are keyed by a hash
/// of the configuration rather than held as global state; a tenant whose
/// configuration changes gets a fresh client on the next job.
#[derive(Default)]
pub struct SotClientFactory {
    clients: Mutex<HashMap<u64, Arc<SotClient>>>,
}

impl SotClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_for(&self, config: &ProviderConfig) -> Result<Arc<SotClient>, ProviderError> {
        let key = config.cache_key();

        if let Some(client) = self.clients.lock().expect("client cache poisoned").get(&key) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(SotClient::new(config)?);
        self.clients
            .lock()
            .expect("client cache poisoned")
            .insert(key, Arc::clone(&client));
        Ok(client)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("provider response did not contain a job id")]
    MissingJobId,

    #[error("provider reported batch failure: {0}")]
    BatchFailed(String),

    #[error("provider batch completed but did not provide a result artifact URL")]
    MissingArtifact,
}
