//! Result artifact decoding.
//!
//! The provider delivers a zip container holding a single AES-CBC-encrypted
//! delimited text file. This module unwraps the container and turns the
//! decrypted text into typed rows; decryption itself lives in
//! [`crate::services::crypto`].

use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::warn;

/// One decoded provider result row.
///
/// Holds the raw values keyed by normalized column name plus the typed
/// fields reconciliation needs. Lives only for the duration of one job's
/// reconciliation step.
#[derive(Debug, Clone)]
pub struct SotResultRow {
    /// Correlation key matching a local identity record.
    pub psn: String,
    pub surname: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub grade_level: Option<String>,
    pub state_ministry: Option<String>,
    pub cadre: Option<String>,
    pub on_transfer: Option<bool>,
    pub date_of_first_appointment: Option<NaiveDate>,
    pub date_of_confirmation: Option<NaiveDate>,
    pub bvn: Option<String>,
    /// All columns as delivered, normalized header -> trimmed value.
    pub raw: HashMap<String, String>,
}

impl SotResultRow {
    /// Full name composed from parts, blank parts skipped.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.surname]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Read the single expected file entry out of a zip container.
///
/// The provider packs exactly one data file per artifact; an archive with no
/// file entries is a fatal integrity error.
pub fn extract_single_entry(bytes: &[u8]) -> Result<Vec<u8>, ArtifactError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;
        return Ok(contents);
    }

    Err(ArtifactError::EmptyArchive)
}

/// Parse decrypted delimited text into result rows.
///
/// Headers are matched case-insensitively (whitespace and underscores
/// ignored) and every field is trimmed. Rows without a correlation key are
/// dropped with a warning; unparsable typed fields are left unset, never
/// fatal.
pub fn parse_rows(text: &[u8]) -> Result<Vec<SotResultRow>, ArtifactError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text);

    let headers: Vec<String> = reader
        .headers()
        .map_err(ArtifactError::Tabular)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(ArtifactError::Tabular)?;

        let raw: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();

        let psn = raw.get("psn").map(String::as_str).unwrap_or("");
        if psn.is_empty() {
            warn!(line = line + 2, "result row has no correlation key, skipping");
            continue;
        }

        rows.push(SotResultRow {
            psn: psn.to_string(),
            surname: field(&raw, "surname"),
            first_name: field(&raw, "firstname"),
            middle_name: field(&raw, "middlename"),
            grade_level: field(&raw, "gradelevel"),
            state_ministry: field(&raw, "stateministry"),
            cadre: field(&raw, "cadre"),
            on_transfer: parse_flag(raw.get("ontransfer")),
            date_of_first_appointment: parse_epoch_ms_date(
                raw.get("dateoffirstappointment"),
                "dateOfFirstAppointment",
            ),
            date_of_confirmation: parse_epoch_ms_date(
                raw.get("dateofconfirmation"),
                "dateOfConfirmation",
            ),
            bvn: field(&raw, "bvn"),
            raw,
        });
    }

    Ok(rows)
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase()
}

fn field(raw: &HashMap<String, String>, key: &str) -> Option<String> {
    raw.get(key).filter(|v| !v.is_empty()).cloned()
}

fn parse_flag(value: Option<&String>) -> Option<bool> {
    match value?.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Dates arrive as millisecond epoch strings. Blank means absent; anything
/// unparsable is logged and dropped so one bad field never sinks the row.
fn parse_epoch_ms_date(value: Option<&String>, column: &str) -> Option<NaiveDate> {
    let value = value?;
    if value.is_empty() {
        return None;
    }

    let parsed = value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.date_naive());

    if parsed.is_none() {
        warn!(column, value = %value, "unparsable date field, leaving unset");
    }
    parsed
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("malformed result container: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read result container entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("result container holds no file entries (empty archive)")]
    EmptyArchive,

    #[error("malformed result rows: {0}")]
    Tabular(#[from] csv::Error),
}
