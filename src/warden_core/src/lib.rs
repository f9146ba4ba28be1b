pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{Account, NewAccount},
    audit::{AuditEvent, LoginFailureReason},
    email::{Email, EmailError},
    mode::AppMode,
    origin::RequestOrigin,
    otp_code::{OTP_CODE_LENGTH, OtpCode, OtpCodeError},
    otp_purpose::{OtpPurpose, OtpPurposeError},
    otp_record::{NewOtpRecord, OtpRecord},
    password::{Password, PasswordError},
    session::{NewSession, Session},
};

pub use ports::{
    repositories::{CredentialStore, CredentialTx, RateLimitError, RateLimiter, StoreError},
    services::{
        Clock, CodeSource, EmailClient, HashError, SecretHasher, TokenClaims, TokenClass,
        TokenError, TokenIssuer,
    },
};

pub use error::{AuthError, AuthErrorKind};
