use serde_json::{Value, json};

use super::otp_purpose::OtpPurpose;

/// Why a login attempt was rejected. Audited internally; the caller only
/// ever sees `INVALID_CREDENTIALS` for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailureReason {
    UnknownAccount,
    InvalidPassword,
}

impl LoginFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownAccount => "not_found",
            Self::InvalidPassword => "invalid_password",
        }
    }
}

/// The closed set of audit event payloads.
///
/// Each variant carries exactly the metadata its event type records, so the
/// trail stays type-safe while remaining schema-light in storage (the
/// metadata column is JSON).
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    Registered { email: String },
    OtpSent { purpose: OtpPurpose },
    OtpVerified { purpose: OtpPurpose },
    PasswordResetVerified,
    LoginFailed {
        email: Option<String>,
        reason: LoginFailureReason,
    },
    LoginSucceeded,
    SessionRefreshed,
    PasswordResetRequested,
    PasswordResetCompleted,
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "auth.register",
            Self::OtpSent { .. } => "auth.send_otp",
            Self::OtpVerified { .. } => "auth.otp_verified",
            Self::PasswordResetVerified => "auth.password_reset_verified",
            Self::LoginFailed { .. } => "auth.login_failed",
            Self::LoginSucceeded => "auth.login_success",
            Self::SessionRefreshed => "auth.refresh",
            Self::PasswordResetRequested => "auth.password_reset_requested",
            Self::PasswordResetCompleted => "auth.password_reset_completed",
        }
    }

    pub fn metadata(&self) -> Value {
        match self {
            Self::Registered { email } => json!({ "email": email }),
            Self::OtpSent { purpose } => json!({ "purpose": purpose.as_str() }),
            Self::OtpVerified { purpose } => json!({ "purpose": purpose.as_str() }),
            Self::LoginFailed { email, reason } => match email {
                Some(email) => json!({ "email": email, "reason": reason.as_str() }),
                None => json!({ "reason": reason.as_str() }),
            },
            Self::PasswordResetVerified
            | Self::LoginSucceeded
            | Self::SessionRefreshed
            | Self::PasswordResetRequested
            | Self::PasswordResetCompleted => json!({}),
        }
    }
}
