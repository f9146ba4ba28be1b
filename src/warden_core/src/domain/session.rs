use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

/// A refresh-token grant. Only the hash of the issued refresh token is
/// stored; revocation is terminal, expiry is a read-time predicate.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    pub refresh_token_hash: Secret<String>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub account_id: Uuid,
    pub refresh_token_hash: Secret<String>,
    pub expires_at: DateTime<Utc>,
}
