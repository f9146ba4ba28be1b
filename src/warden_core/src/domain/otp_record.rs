use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use super::otp_purpose::OtpPurpose;

/// One outstanding one-time code for an (account, purpose) pair.
///
/// Consumption is terminal: a record is marked consumed on successful
/// verification, on expiry detected at read time, or when the attempt
/// ceiling is reached, and never reverts.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub code_hash: Secret<String>,
    pub purpose: OtpPurpose,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Clone)]
pub struct NewOtpRecord {
    pub account_id: Uuid,
    pub code_hash: Secret<String>,
    pub purpose: OtpPurpose,
    pub expires_at: DateTime<Utc>,
    pub max_attempts: i32,
}
