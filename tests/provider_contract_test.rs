//! Provider HTTP contract tests against a wiremock server. These run
//! without any external services.

mod fixtures;

use serde_json::json;
use sot_verify::models::tenant::ProviderConfig;
use sot_verify::services::artifact;
use sot_verify::services::crypto::ResultCipher;
use sot_verify::services::provider::{ProviderError, SotClient, SotClientFactory};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ProviderConfig {
    serde_json::from_str(&fixtures::provider_config_json(&server.uri()))
        .expect("fixture config parses")
}

#[tokio::test]
async fn test_submit_batch_sends_keys_and_returns_job_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bulk-inquiry"))
        .and(header("client-id", fixtures::CLIENT_ID))
        .and(body_json(json!({ "psnList": ["100001", "100002"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "jobId": "prov-42" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = SotClient::new(&config_for(&server)).unwrap();
    let job_id = client
        .submit_batch(&["100001".to_string(), "100002".to_string()])
        .await
        .unwrap();

    assert_eq!(job_id, "prov-42");
}

#[tokio::test]
async fn test_submit_without_job_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bulk-inquiry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;

    let client = SotClient::new(&config_for(&server)).unwrap();
    let error = client
        .submit_batch(&["100001".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::MissingJobId));
}

#[tokio::test]
async fn test_submit_non_2xx_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bulk-inquiry"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = SotClient::new(&config_for(&server)).unwrap();
    let error = client
        .submit_batch(&["100001".to_string()])
        .await
        .unwrap_err();

    match error {
        ProviderError::Status { status, body } => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_poll_status_reads_nested_data() {
    let server = MockServer::start().await;

    fixtures::mount_status(
        &server,
        "prov-42",
        json!({
            "data": {
                "status": "completed",
                "fileUrl": "https://results.example.com/prov-42.zip",
                "fileHash": "abc123",
                "message": "done"
            }
        }),
    )
    .await;

    let client = SotClient::new(&config_for(&server)).unwrap();
    let status = client.poll_status("prov-42").await.unwrap();

    // Terminal states compare case-insensitively.
    assert!(status.is_completed());
    assert!(!status.is_failed());
    assert_eq!(
        status.file_url.as_deref(),
        Some("https://results.example.com/prov-42.zip")
    );
    assert_eq!(status.file_hash.as_deref(), Some("abc123"));
    assert_eq!(status.message.as_deref(), Some("done"));
}

#[tokio::test]
async fn test_poll_status_running_is_not_terminal() {
    let server = MockServer::start().await;

    fixtures::mount_status(&server, "prov-7", json!({ "data": { "status": "RUNNING" } })).await;

    let client = SotClient::new(&config_for(&server)).unwrap();
    let status = client.poll_status("prov-7").await.unwrap();

    assert!(!status.is_completed());
    assert!(!status.is_failed());
    assert_eq!(status.file_url, None);
}

#[tokio::test]
async fn test_fetch_artifact_decodes_end_to_end() {
    let server = MockServer::start().await;

    let artifact = fixtures::result_artifact(&fixtures::two_matches_one_stranger_csv());
    fixtures::mount_artifact(&server, "/files/prov-42.zip", artifact).await;

    let client = SotClient::new(&config_for(&server)).unwrap();
    let container = client
        .fetch_artifact(&format!("{}/files/prov-42.zip", server.uri()))
        .await
        .unwrap();

    // Full decode chain: unzip, decrypt, parse.
    let cipher = ResultCipher::new(fixtures::KEY, fixtures::IV).unwrap();
    let encrypted = artifact::extract_single_entry(&container).unwrap();
    let plaintext = cipher.decrypt(&encrypted).unwrap();
    let rows = artifact::parse_rows(&plaintext).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].psn, "100001");
    assert_eq!(rows[0].full_name(), "Ada Ngozi OKAFOR");
    assert_eq!(rows[1].on_transfer, Some(true));
    assert_eq!(rows[1].date_of_confirmation, None);
    assert_eq!(rows[2].psn, "999999");
}

#[tokio::test]
async fn test_factory_caches_clients_per_config() {
    let server = MockServer::start().await;
    let factory = SotClientFactory::new();

    let config = config_for(&server);
    let first = factory.client_for(&config).unwrap();
    let second = factory.client_for(&config).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let mut changed = config.clone();
    changed.client_id = "another-tenant".to_string();
    let third = factory.client_for(&changed).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
}
