//! Shared fixtures for pipeline tests: provider configs, encrypted result
//! artifacts, and wiremock stubs for the bulk-inquiry API.
#![allow(dead_code)]

use serde_json::json;
use sot_verify::services::crypto::ResultCipher;
use std::io::{Cursor, Write};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

/// Key/IV pair used by the simulated provider (AES-128-CBC).
pub const KEY: &[u8] = b"0123456789abcdef";
pub const IV: &[u8] = b"fedcba9876543210";

pub const CLIENT_ID: &str = "test-client";

pub const RESULT_HEADER: &str = "psn,surname,firstName,middleName,gradeLevel,stateMinistry,cadre,onTransfer,dateOfFirstAppointment,dateOfConfirmation,bvn";

/// Tenant provider configuration pointing at a mock server.
pub fn provider_config_json(base_url: &str) -> String {
    json!({
        "provider_name": "OPTIMA",
        "api_base_url": base_url,
        "client_id": CLIENT_ID,
        "result_key": String::from_utf8_lossy(KEY),
        "result_iv": String::from_utf8_lossy(IV),
    })
    .to_string()
}

/// Same configuration but with a key the artifact was NOT encrypted with.
pub fn provider_config_json_wrong_key(base_url: &str) -> String {
    json!({
        "provider_name": "OPTIMA",
        "api_base_url": base_url,
        "client_id": CLIENT_ID,
        "result_key": "ffffffffffffffff",
        "result_iv": String::from_utf8_lossy(IV),
    })
    .to_string()
}

pub fn zip_single(name: &str, contents: &[u8]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(contents).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn empty_zip() -> Vec<u8> {
    let writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.finish().unwrap().into_inner()
}

/// Build a result artifact the way the provider does: CSV text, AES-CBC
/// encrypted, wrapped in a single-entry zip.
pub fn result_artifact(csv_text: &str) -> Vec<u8> {
    let cipher = ResultCipher::new(KEY, IV).unwrap();
    let encrypted = cipher.encrypt(csv_text.as_bytes()).unwrap();
    zip_single("results.csv", &encrypted)
}

/// CSV payload with two rows matching seeded PSNs and one unknown row.
pub fn two_matches_one_stranger_csv() -> String {
    format!(
        "{RESULT_HEADER}\n\
         100001,OKAFOR,Ada,Ngozi,GL-08,Ministry of Health,Nursing,false,1262304000000,1577836800000,22123456789\n\
         100002,BELLO,Musa,,GL-10,Ministry of Works,Engineering,true,1325376000000,,22987654321\n\
         999999,GHOST,Casper,,GL-01,Ministry of Mystery,Unknown,false,,,\n"
    )
}

/// Stub the submit endpoint to hand out `provider_job_id`.
pub async fn mount_submit(server: &MockServer, provider_job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/bulk-inquiry"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "jobId": provider_job_id }
            })),
        )
        .mount(server)
        .await;
}

/// Stub the status endpoint with a fixed response body.
pub async fn mount_status(server: &MockServer, provider_job_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/bulk-inquiry/{provider_job_id}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Stub the artifact download URL with raw container bytes.
pub async fn mount_artifact(server: &MockServer, artifact_path: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(artifact_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}
