use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Workflow status of an identity record.
///
/// The bulk pipeline selects records in `PendingVerification` and moves the
/// ones it matches to `PendingGradeValidation`; the remaining variants belong
/// to the downstream review flow and are carried here so status text stays in
/// one place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    PendingVerification,
    PendingGradeValidation,
    Validated,
    FlaggedDataMismatch,
}

/// An employee identity record owned by a tenant.
///
/// The bulk pipeline reads the PSN (the correlation key) and writes back the
/// provider-confirmed fields plus a status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Personnel Service Number, the stable correlation key.
    pub psn: String,
    pub full_name: String,
    pub grade_level: Option<String>,
    pub department_id: Option<Uuid>,
    pub cadre: Option<String>,
    pub on_transfer: Option<bool>,
    pub date_of_first_appointment: Option<NaiveDate>,
    pub date_of_confirmation: Option<NaiveDate>,
    /// Bank verification identifier returned by the provider.
    pub bvn: Option<String>,
    pub status: RecordStatus,
    /// Raw provider row kept for mismatch review.
    pub sot_data: Option<serde_json::Value>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_status_db_text() {
        assert_eq!(
            RecordStatus::PendingGradeValidation.to_string(),
            "PENDING_GRADE_VALIDATION"
        );
        assert_eq!(
            "PENDING_VERIFICATION".parse::<RecordStatus>().unwrap(),
            RecordStatus::PendingVerification
        );
    }
}
