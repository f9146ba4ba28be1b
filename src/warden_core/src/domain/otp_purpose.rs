use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpPurposeError {
    #[error("Unknown OTP purpose: {0}")]
    Unknown(String),
}

/// Why an OTP was issued. At most one unconsumed code exists per
/// (account, purpose) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Register,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::PasswordReset => "password_reset",
        }
    }

    /// Human wording used in delivery subjects, e.g. "password reset code".
    pub fn subject_noun(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::PasswordReset => "password reset",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = OtpPurposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(Self::Register),
            "password_reset" => Ok(Self::PasswordReset),
            other => Err(OtpPurposeError::Unknown(other.to_string())),
        }
    }
}
