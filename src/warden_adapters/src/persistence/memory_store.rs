use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use warden_core::{
    Account, AuditEvent, CredentialStore, CredentialTx, Email, NewAccount, NewOtpRecord,
    NewSession, OtpPurpose, OtpRecord, RequestOrigin, Session, StoreError,
};

/// What the in-memory store persists for each audit append.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub event_type: String,
    pub metadata: Value,
    pub origin: RequestOrigin,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    accounts: Vec<Account>,
    otps: Vec<OtpRecord>,
    sessions: Vec<Session>,
    audit_log: Vec<AuditRecord>,
}

/// In-memory credential store for tests and local development.
///
/// A transaction holds the whole-store lock for its lifetime, which makes
/// concurrent operations strictly serializable, and keeps a snapshot taken
/// at `begin` so that dropping an uncommitted transaction restores the
/// prior state.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.state.lock().await.accounts.clone()
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions.clone()
    }

    pub async fn otp_records(&self) -> Vec<OtpRecord> {
        self.state.lock().await.otps.clone()
    }

    pub async fn audit_events(&self) -> Vec<AuditRecord> {
        self.state.lock().await.audit_log.clone()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    type Tx = InMemoryCredentialTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let snapshot = guard.clone();
        Ok(InMemoryCredentialTx {
            guard,
            snapshot: Some(snapshot),
        })
    }
}

pub struct InMemoryCredentialTx {
    guard: OwnedMutexGuard<StoreState>,
    /// `Some` while uncommitted; restored on drop.
    snapshot: Option<StoreState>,
}

impl Drop for InMemoryCredentialTx {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait]
impl CredentialTx for InMemoryCredentialTx {
    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .guard
            .accounts
            .iter()
            .find(|account| account.email == *email)
            .cloned())
    }

    async fn insert_account(
        &mut self,
        account: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        if self
            .guard
            .accounts
            .iter()
            .any(|existing| existing.email == account.email)
        {
            return Err(StoreError::EmailTaken);
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: account.email,
            password_hash: account.password_hash,
            name: account.name,
            verified: false,
            created_at: now,
            updated_at: now,
        };
        self.guard.accounts.push(account.clone());
        Ok(account)
    }

    async fn mark_account_verified(
        &mut self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        for account in &mut self.guard.accounts {
            if account.id == account_id {
                account.verified = true;
                account.updated_at = now;
            }
        }
        Ok(())
    }

    async fn update_password_hash(
        &mut self,
        account_id: Uuid,
        password_hash: Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        for account in &mut self.guard.accounts {
            if account.id == account_id {
                account.password_hash = password_hash.clone();
                account.updated_at = now;
            }
        }
        Ok(())
    }

    async fn replace_otp(
        &mut self,
        otp: NewOtpRecord,
        now: DateTime<Utc>,
    ) -> Result<OtpRecord, StoreError> {
        self.guard
            .otps
            .retain(|existing| !(existing.account_id == otp.account_id && existing.purpose == otp.purpose));
        let record = OtpRecord {
            id: Uuid::new_v4(),
            account_id: otp.account_id,
            code_hash: otp.code_hash,
            purpose: otp.purpose,
            expires_at: otp.expires_at,
            attempts: 0,
            max_attempts: otp.max_attempts,
            consumed_at: None,
            created_at: now,
        };
        self.guard.otps.push(record.clone());
        Ok(record)
    }

    async fn active_otp(
        &mut self,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, StoreError> {
        // Newest first; insertion order breaks created_at ties.
        Ok(self
            .guard
            .otps
            .iter()
            .rev()
            .filter(|otp| otp.account_id == account_id && otp.purpose == purpose)
            .find(|otp| otp.consumed_at.is_none())
            .cloned())
    }

    async fn increment_otp_attempts(&mut self, otp_id: Uuid) -> Result<i32, StoreError> {
        let otp = self
            .guard
            .otps
            .iter_mut()
            .find(|otp| otp.id == otp_id)
            .ok_or_else(|| StoreError::Unexpected("unknown OTP record".to_string()))?;
        otp.attempts += 1;
        Ok(otp.attempts)
    }

    async fn consume_otp(&mut self, otp_id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError> {
        for otp in &mut self.guard.otps {
            if otp.id == otp_id {
                otp.consumed_at = Some(now);
            }
        }
        Ok(())
    }

    async fn insert_session(
        &mut self,
        session: NewSession,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let session = Session {
            id: Uuid::new_v4(),
            account_id: session.account_id,
            refresh_token_hash: session.refresh_token_hash,
            expires_at: session.expires_at,
            revoked_at: None,
            created_at: now,
        };
        self.guard.sessions.push(session.clone());
        Ok(session)
    }

    async fn active_sessions(
        &mut self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .guard
            .sessions
            .iter()
            .filter(|session| {
                session.account_id == account_id
                    && session.revoked_at.is_none()
                    && session.expires_at > now
            })
            .cloned()
            .collect())
    }

    async fn revoke_session(
        &mut self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        for session in &mut self.guard.sessions {
            if session.id == session_id {
                session.revoked_at = Some(now);
            }
        }
        Ok(())
    }

    async fn append_audit(
        &mut self,
        account_id: Option<Uuid>,
        event: &AuditEvent,
        origin: &RequestOrigin,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.guard.audit_log.push(AuditRecord {
            id: Uuid::new_v4(),
            account_id,
            event_type: event.event_type().to_string(),
            metadata: event.metadata(),
            origin: origin.clone(),
            created_at: now,
        });
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::Secret;

    use super::*;

    fn email(raw: &str) -> Email {
        Email::try_from(Secret::from(raw.to_string())).unwrap()
    }

    fn new_account(raw_email: &str) -> NewAccount {
        NewAccount {
            email: email(raw_email),
            password_hash: Secret::from("$argon2id$stub".to_string()),
            name: "Test User".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_account_enforces_email_uniqueness() {
        let store = InMemoryCredentialStore::new();
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        tx.insert_account(new_account("dup@example.com"), now)
            .await
            .unwrap();
        let conflict = tx.insert_account(new_account("dup@example.com"), now).await;
        assert_eq!(conflict.unwrap_err(), StoreError::EmailTaken);
    }

    #[tokio::test]
    async fn dropping_an_uncommitted_tx_rolls_back() {
        let store = InMemoryCredentialStore::new();
        let now = Utc::now();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_account(new_account("gone@example.com"), now)
                .await
                .unwrap();
            // no commit
        }

        assert!(store.accounts().await.is_empty());
    }

    #[tokio::test]
    async fn replace_otp_leaves_a_single_record_per_purpose() {
        let store = InMemoryCredentialStore::new();
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        let account = tx
            .insert_account(new_account("otp@example.com"), now)
            .await
            .unwrap();
        for _ in 0..3 {
            tx.replace_otp(
                NewOtpRecord {
                    account_id: account.id,
                    code_hash: Secret::from("$argon2id$stub".to_string()),
                    purpose: OtpPurpose::Register,
                    expires_at: now + chrono::Duration::minutes(10),
                    max_attempts: 5,
                },
                now,
            )
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        assert_eq!(store.otp_records().await.len(), 1);
    }
}
