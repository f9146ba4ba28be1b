use thiserror::Error;

use crate::ports::{
    repositories::{RateLimitError, StoreError},
    services::{HashError, TokenError},
};

/// Stable failure codes. Each maps to a fixed transport status owned by the
/// boundary layer; the core only decides which kind applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    UserExists,
    UserNotFound,
    UserNotVerified,
    InvalidCredentials,
    OtpInvalid,
    OtpExpired,
    OtpAttemptsExceeded,
    RateLimited,
    SessionInvalid,
    /// Produced by the HTTP layer for request shapes the core never sees.
    Unprocessable,
}

impl AuthErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserExists => "USER_EXISTS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserNotVerified => "USER_NOT_VERIFIED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::OtpInvalid => "OTP_INVALID",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpAttemptsExceeded => "OTP_ATTEMPTS_EXCEEDED",
            Self::RateLimited => "RATE_LIMITED",
            Self::SessionInvalid => "SESSION_INVALID",
            Self::Unprocessable => "UNPROCESSABLE",
        }
    }
}

/// Failure surface of every engine operation.
///
/// Taxonomy variants carry a user-presentable message and a stable kind;
/// the wrapped infrastructure errors propagate unmodified and always abort
/// the transaction.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserExists,
    #[error("User not found")]
    UserNotFound,
    #[error("User is not verified")]
    UserNotVerified,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Incorrect OTP")]
    OtpInvalid,
    #[error("OTP expired")]
    OtpExpired,
    #[error("OTP attempt limit reached")]
    OtpAttemptsExceeded,
    #[error("Request limit reached")]
    RateLimited,
    #[error("Invalid session")]
    SessionInvalid,

    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    RateLimiter(#[from] RateLimitError),
}

impl AuthError {
    /// `None` for infrastructure errors, which the boundary reports as an
    /// opaque internal failure.
    pub fn kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::UserExists => Some(AuthErrorKind::UserExists),
            Self::UserNotFound => Some(AuthErrorKind::UserNotFound),
            Self::UserNotVerified => Some(AuthErrorKind::UserNotVerified),
            Self::InvalidCredentials => Some(AuthErrorKind::InvalidCredentials),
            Self::OtpInvalid => Some(AuthErrorKind::OtpInvalid),
            Self::OtpExpired => Some(AuthErrorKind::OtpExpired),
            Self::OtpAttemptsExceeded => Some(AuthErrorKind::OtpAttemptsExceeded),
            Self::RateLimited => Some(AuthErrorKind::RateLimited),
            Self::SessionInvalid => Some(AuthErrorKind::SessionInvalid),
            Self::Store(_) | Self::Hash(_) | Self::Token(_) | Self::RateLimiter(_) => None,
        }
    }
}
