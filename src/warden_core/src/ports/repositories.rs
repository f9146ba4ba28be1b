use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    account::{Account, NewAccount},
    audit::AuditEvent,
    email::Email,
    origin::RequestOrigin,
    otp_purpose::OtpPurpose,
    otp_record::{NewOtpRecord, OtpRecord},
    session::{NewSession, Session},
};

// CredentialStore port trait and errors
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Unexpected store error: {0}")]
    Unexpected(String),
}

/// Transactional persistence for accounts, OTP records, sessions, and the
/// audit trail.
///
/// Every engine operation runs against a single [`CredentialTx`]: either all
/// of its writes commit or none do. Implementations must serialize
/// conflicting writes to the same row, so that e.g. two concurrent
/// verifications of the same OTP record cannot both observe a
/// below-the-ceiling attempt count.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    type Tx: CredentialTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One atomic unit of work. Dropping an uncommitted transaction rolls back
/// everything written through it.
#[async_trait]
pub trait CredentialTx: Send {
    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<Account>, StoreError>;

    /// Inserts a new, unverified account. A concurrent insert for the same
    /// email must surface as [`StoreError::EmailTaken`] through the store's
    /// own uniqueness constraint, not a prior existence check.
    async fn insert_account(
        &mut self,
        account: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError>;

    async fn mark_account_verified(
        &mut self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn update_password_hash(
        &mut self,
        account_id: Uuid,
        password_hash: Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Deletes any prior unconsumed record for the same (account, purpose)
    /// and inserts the new one, keeping the one-outstanding-code invariant.
    async fn replace_otp(
        &mut self,
        otp: NewOtpRecord,
        now: DateTime<Utc>,
    ) -> Result<OtpRecord, StoreError>;

    /// At most one unconsumed record, most recently created first. The row
    /// is locked for the remainder of the transaction where the backend
    /// supports it.
    async fn active_otp(
        &mut self,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, StoreError>;

    /// Atomic relative-to-prior-value increment; returns the new count.
    async fn increment_otp_attempts(&mut self, otp_id: Uuid) -> Result<i32, StoreError>;

    async fn consume_otp(&mut self, otp_id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError>;

    async fn insert_session(
        &mut self,
        session: NewSession,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    /// Sessions that are neither revoked nor expired as of `now`.
    async fn active_sessions(
        &mut self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, StoreError>;

    async fn revoke_session(
        &mut self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Appends an immutable audit record inside this transaction.
    async fn append_audit(
        &mut self,
        account_id: Option<Uuid>,
        event: &AuditEvent,
        origin: &RequestOrigin,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}

// RateLimiter port trait and errors
#[derive(Debug, Error, PartialEq)]
pub enum RateLimitError {
    #[error("Unexpected rate limiter error: {0}")]
    Unexpected(String),
}

/// Windowed counter: at most `limit` consumes per `window_seconds` for a
/// given key. The allow decision must be made on the post-increment count so
/// concurrent consumers for the same key cannot all squeeze under the limit.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<bool, RateLimitError>;
}

// Lets the composition root pick a strategy at runtime and still satisfy
// the engine's generic bound.
#[async_trait]
impl RateLimiter for std::sync::Arc<dyn RateLimiter> {
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<bool, RateLimitError> {
        (**self).consume(key, limit, window_seconds).await
    }
}
