use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{email::Email, otp_code::OtpCode};

/// Fire-and-forget delivery channel for OTP codes. The engine invokes it
/// after the transaction has committed; a failure is reported as a warning,
/// never as an operation failure.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String>;
}

// Lets the composition root pick a delivery channel at runtime and still
// satisfy the engine's generic bound.
#[async_trait]
impl EmailClient for std::sync::Arc<dyn EmailClient> {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        (**self).send_email(recipient, subject, content).await
    }
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Hashing failure: {0}")]
    Unexpected(String),
}

/// One-way hashing with a configurable work factor, used for passwords, OTP
/// codes, and refresh tokens alike. Comparison always goes through
/// [`SecretHasher::verify`]; stored hashes are never decoded.
#[async_trait]
pub trait SecretHasher: Send + Sync {
    async fn hash(&self, secret: Secret<String>) -> Result<Secret<String>, HashError>;

    /// `Ok(false)` on mismatch; `Err` only for infrastructure failures.
    async fn verify(
        &self,
        candidate: Secret<String>,
        expected_hash: Secret<String>,
    ) -> Result<bool, HashError>;
}

/// The class claim embedded in every signed token, so a refresh token can
/// never pass where an access token is required and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub account_id: Uuid,
    pub class: TokenClass,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Verification fails closed: signature, expiry, and malformed-claim
    /// problems are indistinguishable to the caller.
    #[error("Token verification failed")]
    Verification,
    #[error("Token signing failed: {0}")]
    Signing(String),
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, account_id: Uuid, class: TokenClass) -> Result<String, TokenError>;

    fn verify(&self, token: &str, expected: TokenClass) -> Result<TokenClaims, TokenError>;
}

/// Injected wall clock so expiry logic is deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Injected source of fresh OTP codes.
pub trait CodeSource: Send + Sync {
    fn generate(&self) -> OtpCode;
}
