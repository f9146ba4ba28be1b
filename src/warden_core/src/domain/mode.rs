use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppModeError {
    #[error("Unknown application mode: {0}")]
    Unknown(String),
}

/// Operating mode of the service.
///
/// The only behavioral switch inside the core is whether raw OTP codes are
/// echoed back to callers; production never echoes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Development,
    Test,
    Production,
}

impl AppMode {
    pub fn echoes_otp(&self) -> bool {
        !matches!(self, Self::Production)
    }
}

impl FromStr for AppMode {
    type Err = AppModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => Err(AppModeError::Unknown(other.to_string())),
        }
    }
}
