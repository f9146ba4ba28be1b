mod login;
mod password_reset;
mod refresh;
mod register;
mod send_otp;
mod verify_otp;

pub use login::{LoginRequest, TokenGrant};
pub use password_reset::{
    PasswordResetConfirm, PasswordResetOutcome, PasswordResetRequest, ResetRequestOutcome,
};
pub use refresh::RefreshRequest;
pub use register::{RegisterRequest, RegisterOutcome};
pub use send_otp::{SendOtpOutcome, SendOtpRequest};
pub use verify_otp::{VerifyOtpOutcome, VerifyOtpRequest};

use std::sync::Arc;

use chrono::Duration;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use warden_core::{
    AuthError, Clock, CodeSource, CredentialStore, CredentialTx, Email, EmailClient, NewOtpRecord,
    NewSession, OtpCode, OtpPurpose, OtpRecord, RateLimiter, SecretHasher, TokenClass, TokenIssuer,
};

use crate::config::EngineConfig;

/// Orchestrates the seven credential operations.
///
/// Every operation is stateless: it opens one transaction against the
/// credential store, performs its reads and writes, and commits or rolls
/// back as a unit. The only process-wide state lives behind the injected
/// rate limiter and token issuer, both safe for concurrent use.
pub struct AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    store: S,
    rate_limiter: R,
    email_client: M,
    hasher: Arc<dyn SecretHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
    code_source: Arc<dyn CodeSource>,
    config: EngineConfig,
}

/// Outcome of checking a supplied code against the active OTP record.
///
/// A rejection is itself a state transition (attempt counter, terminal
/// consumption), so the caller commits the transaction before returning the
/// failure.
pub(crate) enum OtpVerdict {
    Verified,
    Rejected(AuthError),
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: S,
        rate_limiter: R,
        email_client: M,
        hasher: Arc<dyn SecretHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
        code_source: Arc<dyn CodeSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            rate_limiter,
            email_client,
            hasher,
            token_issuer,
            clock,
            code_source,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn rate_limiter(&self) -> &R {
        &self.rate_limiter
    }

    pub(crate) fn hasher(&self) -> &Arc<dyn SecretHasher> {
        &self.hasher
    }

    pub(crate) fn token_issuer(&self) -> &Arc<dyn TokenIssuer> {
        &self.token_issuer
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Issues a fresh OTP for the account, superseding any outstanding code
    /// for the same purpose.
    pub(crate) async fn issue_otp(
        &self,
        tx: &mut S::Tx,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<OtpCode, AuthError> {
        let code = self.code_source.generate();
        let code_hash = self
            .hasher
            .hash(Secret::from(code.as_str().to_string()))
            .await?;
        let now = self.now();
        tx.replace_otp(
            NewOtpRecord {
                account_id,
                code_hash,
                purpose,
                expires_at: now + Duration::minutes(self.config.otp_ttl_minutes),
                max_attempts: self.config.otp_attempt_limit,
            },
            now,
        )
        .await?;
        Ok(code)
    }

    /// Walks the OTP verification state machine: expiry before hash
    /// comparison, terminal consumption on expiry or an exhausted attempt
    /// ceiling, consumption on success.
    pub(crate) async fn check_and_consume_otp(
        &self,
        tx: &mut S::Tx,
        account_id: Uuid,
        purpose: OtpPurpose,
        code: &OtpCode,
    ) -> Result<OtpVerdict, AuthError> {
        let Some(otp) = tx.active_otp(account_id, purpose).await? else {
            return Ok(OtpVerdict::Rejected(AuthError::OtpInvalid));
        };

        let now = self.now();
        if otp.is_expired(now) {
            tx.consume_otp(otp.id, now).await?;
            return Ok(OtpVerdict::Rejected(AuthError::OtpExpired));
        }

        if !self.code_matches(code, &otp).await? {
            let attempts = tx.increment_otp_attempts(otp.id).await?;
            if attempts >= otp.max_attempts {
                tx.consume_otp(otp.id, now).await?;
                return Ok(OtpVerdict::Rejected(AuthError::OtpAttemptsExceeded));
            }
            return Ok(OtpVerdict::Rejected(AuthError::OtpInvalid));
        }

        tx.consume_otp(otp.id, now).await?;
        Ok(OtpVerdict::Verified)
    }

    async fn code_matches(&self, code: &OtpCode, otp: &OtpRecord) -> Result<bool, AuthError> {
        let matches = self
            .hasher
            .verify(
                Secret::from(code.as_str().to_string()),
                otp.code_hash.clone(),
            )
            .await?;
        Ok(matches)
    }

    /// Mints an access/refresh pair and persists the new session (hash of
    /// the refresh token only).
    pub(crate) async fn open_session(
        &self,
        tx: &mut S::Tx,
        account_id: Uuid,
    ) -> Result<TokenGrant, AuthError> {
        let access_token = self.token_issuer.issue(account_id, TokenClass::Access)?;
        let refresh_token = self.token_issuer.issue(account_id, TokenClass::Refresh)?;
        let refresh_token_hash = self
            .hasher
            .hash(Secret::from(refresh_token.clone()))
            .await?;

        let now = self.now();
        tx.insert_session(
            NewSession {
                account_id,
                refresh_token_hash,
                expires_at: now + Duration::days(self.config.refresh_token_ttl_days),
            },
            now,
        )
        .await?;

        Ok(TokenGrant {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_ttl_seconds(),
        })
    }

    /// Best-effort, post-commit delivery. A failure never rolls back or
    /// fails the operation that issued the code.
    pub(crate) async fn dispatch_code(
        &self,
        recipient: &Email,
        code: &OtpCode,
        purpose: OtpPurpose,
    ) {
        let subject = format!("Your {} code", purpose.subject_noun());
        let body = format!("Your verification code is: {}", code.as_str());
        if let Err(reason) = self
            .email_client
            .send_email(recipient, &subject, &body)
            .await
        {
            tracing::warn!(%purpose, reason = %reason, "failed to deliver OTP code");
        }
    }

    /// The raw code is an observability escape hatch for callers; production
    /// never leaks it.
    pub(crate) fn echoed_code(&self, code: OtpCode) -> Option<OtpCode> {
        self.config.mode.echoes_otp().then_some(code)
    }

    pub(crate) fn exposed_email(email: &Email) -> String {
        email.as_ref().expose_secret().clone()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use warden_core::{
        Account, AuditEvent, HashError, NewAccount, RateLimitError, RequestOrigin, Session,
        StoreError, TokenClaims, TokenError,
    };

    use super::*;

    // Minimal mocks: only the paths the OTP state machine touches are live.
    #[derive(Clone)]
    struct MockStore {
        otp: Arc<std::sync::Mutex<Option<OtpRecord>>>,
    }

    struct MockTx {
        otp: Arc<std::sync::Mutex<Option<OtpRecord>>>,
    }

    #[async_trait]
    impl CredentialStore for MockStore {
        type Tx = MockTx;

        async fn begin(&self) -> Result<Self::Tx, StoreError> {
            Ok(MockTx {
                otp: Arc::clone(&self.otp),
            })
        }
    }

    #[async_trait]
    impl CredentialTx for MockTx {
        async fn find_account_by_email(
            &mut self,
            _email: &Email,
        ) -> Result<Option<Account>, StoreError> {
            unimplemented!()
        }

        async fn insert_account(
            &mut self,
            _account: NewAccount,
            _now: DateTime<Utc>,
        ) -> Result<Account, StoreError> {
            unimplemented!()
        }

        async fn mark_account_verified(
            &mut self,
            _account_id: Uuid,
            _now: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            unimplemented!()
        }

        async fn update_password_hash(
            &mut self,
            _account_id: Uuid,
            _password_hash: Secret<String>,
            _now: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            unimplemented!()
        }

        async fn replace_otp(
            &mut self,
            _otp: NewOtpRecord,
            _now: DateTime<Utc>,
        ) -> Result<OtpRecord, StoreError> {
            unimplemented!()
        }

        async fn active_otp(
            &mut self,
            _account_id: Uuid,
            _purpose: OtpPurpose,
        ) -> Result<Option<OtpRecord>, StoreError> {
            let otp = self.otp.lock().unwrap();
            Ok(otp.clone().filter(|record| record.consumed_at.is_none()))
        }

        async fn increment_otp_attempts(&mut self, _otp_id: Uuid) -> Result<i32, StoreError> {
            let mut otp = self.otp.lock().unwrap();
            let record = otp.as_mut().expect("record exists");
            record.attempts += 1;
            Ok(record.attempts)
        }

        async fn consume_otp(
            &mut self,
            _otp_id: Uuid,
            now: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            let mut otp = self.otp.lock().unwrap();
            if let Some(record) = otp.as_mut() {
                record.consumed_at = Some(now);
            }
            Ok(())
        }

        async fn insert_session(
            &mut self,
            _session: NewSession,
            _now: DateTime<Utc>,
        ) -> Result<Session, StoreError> {
            unimplemented!()
        }

        async fn active_sessions(
            &mut self,
            _account_id: Uuid,
            _now: DateTime<Utc>,
        ) -> Result<Vec<Session>, StoreError> {
            unimplemented!()
        }

        async fn revoke_session(
            &mut self,
            _session_id: Uuid,
            _now: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            unimplemented!()
        }

        async fn append_audit(
            &mut self,
            _account_id: Option<Uuid>,
            _event: &AuditEvent,
            _origin: &RequestOrigin,
            _now: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn commit(self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[derive(Clone)]
    struct MockRateLimiter;

    #[async_trait]
    impl RateLimiter for MockRateLimiter {
        async fn consume(&self, _: &str, _: u32, _: u64) -> Result<bool, RateLimitError> {
            Ok(true)
        }
    }

    #[derive(Clone)]
    struct MockEmailClient;

    #[async_trait]
    impl EmailClient for MockEmailClient {
        async fn send_email(&self, _: &Email, _: &str, _: &str) -> Result<(), String> {
            Ok(())
        }
    }

    /// Stores the value verbatim; verification is plain string equality.
    struct PlainHasher;

    #[async_trait]
    impl SecretHasher for PlainHasher {
        async fn hash(&self, secret: Secret<String>) -> Result<Secret<String>, HashError> {
            Ok(secret)
        }

        async fn verify(
            &self,
            candidate: Secret<String>,
            expected_hash: Secret<String>,
        ) -> Result<bool, HashError> {
            Ok(candidate.expose_secret() == expected_hash.expose_secret())
        }
    }

    struct MockTokenIssuer;

    impl TokenIssuer for MockTokenIssuer {
        fn issue(&self, _: Uuid, _: TokenClass) -> Result<String, TokenError> {
            unimplemented!()
        }

        fn verify(&self, _: &str, _: TokenClass) -> Result<TokenClaims, TokenError> {
            unimplemented!()
        }
    }

    struct FixedClock(chrono::DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            self.0
        }
    }

    struct FixedCode;

    impl CodeSource for FixedCode {
        fn generate(&self) -> OtpCode {
            OtpCode::parse("123456").unwrap()
        }
    }

    fn record(now: chrono::DateTime<Utc>, attempts: i32) -> OtpRecord {
        OtpRecord {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            code_hash: Secret::from("123456".to_string()),
            purpose: OtpPurpose::Register,
            expires_at: now + Duration::minutes(10),
            attempts,
            max_attempts: 5,
            consumed_at: None,
            created_at: now,
        }
    }

    fn engine(
        now: chrono::DateTime<Utc>,
        otp: Arc<std::sync::Mutex<Option<OtpRecord>>>,
    ) -> AuthEngine<MockStore, MockRateLimiter, MockEmailClient> {
        AuthEngine::new(
            MockStore { otp },
            MockRateLimiter,
            MockEmailClient,
            Arc::new(PlainHasher),
            Arc::new(MockTokenIssuer),
            Arc::new(FixedClock(now)),
            Arc::new(FixedCode),
            crate::config::EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn matching_code_consumes_the_record() {
        let now = Utc::now();
        let otp = Arc::new(std::sync::Mutex::new(Some(record(now, 0))));
        let engine = engine(now, Arc::clone(&otp));
        let mut tx = engine.store().begin().await.unwrap();

        let verdict = engine
            .check_and_consume_otp(
                &mut tx,
                Uuid::new_v4(),
                OtpPurpose::Register,
                &OtpCode::parse("123456").unwrap(),
            )
            .await
            .unwrap();

        assert!(matches!(verdict, OtpVerdict::Verified));
        assert!(otp.lock().unwrap().as_ref().unwrap().consumed_at.is_some());
    }

    #[tokio::test]
    async fn expiry_wins_over_a_correct_code() {
        let now = Utc::now();
        let mut expired = record(now, 0);
        expired.expires_at = now - Duration::minutes(1);
        let otp = Arc::new(std::sync::Mutex::new(Some(expired)));
        let engine = engine(now, Arc::clone(&otp));
        let mut tx = engine.store().begin().await.unwrap();

        let verdict = engine
            .check_and_consume_otp(
                &mut tx,
                Uuid::new_v4(),
                OtpPurpose::Register,
                &OtpCode::parse("123456").unwrap(),
            )
            .await
            .unwrap();

        // Expiry is checked before the hash comparison, and it consumes.
        assert!(matches!(
            verdict,
            OtpVerdict::Rejected(AuthError::OtpExpired)
        ));
        assert!(otp.lock().unwrap().as_ref().unwrap().consumed_at.is_some());
    }

    #[tokio::test]
    async fn reaching_the_ceiling_consumes_the_record() {
        let now = Utc::now();
        let otp = Arc::new(std::sync::Mutex::new(Some(record(now, 4))));
        let engine = engine(now, Arc::clone(&otp));
        let mut tx = engine.store().begin().await.unwrap();

        let verdict = engine
            .check_and_consume_otp(
                &mut tx,
                Uuid::new_v4(),
                OtpPurpose::Register,
                &OtpCode::parse("999999").unwrap(),
            )
            .await
            .unwrap();

        assert!(matches!(
            verdict,
            OtpVerdict::Rejected(AuthError::OtpAttemptsExceeded)
        ));
        let record = otp.lock().unwrap().clone().unwrap();
        assert_eq!(record.attempts, 5);
        assert!(record.consumed_at.is_some());
    }

    #[tokio::test]
    async fn wrong_code_below_the_ceiling_keeps_the_record_alive() {
        let now = Utc::now();
        let otp = Arc::new(std::sync::Mutex::new(Some(record(now, 0))));
        let engine = engine(now, Arc::clone(&otp));
        let mut tx = engine.store().begin().await.unwrap();

        let verdict = engine
            .check_and_consume_otp(
                &mut tx,
                Uuid::new_v4(),
                OtpPurpose::Register,
                &OtpCode::parse("999999").unwrap(),
            )
            .await
            .unwrap();

        assert!(matches!(
            verdict,
            OtpVerdict::Rejected(AuthError::OtpInvalid)
        ));
        let record = otp.lock().unwrap().clone().unwrap();
        assert_eq!(record.attempts, 1);
        assert!(record.consumed_at.is_none());
    }
}
