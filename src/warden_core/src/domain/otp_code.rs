use thiserror::Error;

pub const OTP_CODE_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum OtpCodeError {
    #[error("OTP code must be exactly {OTP_CODE_LENGTH} digits")]
    WrongLength,
    #[error("OTP code must contain only digits")]
    NotNumeric,
}

/// A six-digit one-time code.
///
/// Only the hash of a code is ever persisted; the raw value lives just long
/// enough to be delivered (and, outside production, echoed to the caller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn parse(raw: impl Into<String>) -> Result<Self, OtpCodeError> {
        let raw = raw.into();
        if raw.len() != OTP_CODE_LENGTH {
            return Err(OtpCodeError::WrongLength);
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NotNumeric);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
