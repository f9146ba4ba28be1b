use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use warden_application::EngineConfig;
use warden_core::AppMode;

const MIN_SIGNING_SECRET_LENGTH: usize = 16;

/// Service configuration, read once at startup from the environment (a
/// `.env` file is honored when present). Field names map to the upper-case
/// env vars, e.g. `access_token_ttl_minutes` <- `ACCESS_TOKEN_TTL_MINUTES`.
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app_env: AppMode,
    #[serde(default = "defaults::app_port")]
    pub app_port: u16,
    pub database_url: Secret<String>,
    pub jwt_secret: Secret<String>,

    #[serde(default = "defaults::access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "defaults::refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
    #[serde(default = "defaults::otp_ttl_minutes")]
    pub otp_ttl_minutes: i64,
    #[serde(default = "defaults::otp_attempt_limit")]
    pub otp_attempt_limit: i32,
    #[serde(default = "defaults::otp_send_window_seconds")]
    pub otp_send_window_seconds: u64,
    #[serde(default = "defaults::otp_send_max")]
    pub otp_send_max: u32,
    #[serde(default = "defaults::rate_limit_window_seconds")]
    pub rate_limit_window_seconds: u64,
    #[serde(default = "defaults::rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    #[serde(default = "defaults::argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "defaults::argon2_iterations")]
    pub argon2_iterations: u32,
    #[serde(default = "defaults::argon2_parallelism")]
    pub argon2_parallelism: u32,

    #[serde(default = "defaults::postmark_base_url")]
    pub postmark_base_url: String,
    pub postmark_sender: Option<String>,
    pub postmark_auth_token: Option<Secret<String>>,
    #[serde(default = "defaults::email_timeout_millis")]
    pub email_timeout_millis: u64,
}

mod defaults {
    pub fn app_port() -> u16 {
        8000
    }
    pub fn access_token_ttl_minutes() -> i64 {
        15
    }
    pub fn refresh_token_ttl_days() -> i64 {
        7
    }
    pub fn otp_ttl_minutes() -> i64 {
        10
    }
    pub fn otp_attempt_limit() -> i32 {
        5
    }
    pub fn otp_send_window_seconds() -> u64 {
        60
    }
    pub fn otp_send_max() -> u32 {
        3
    }
    pub fn rate_limit_window_seconds() -> u64 {
        60
    }
    pub fn rate_limit_max_requests() -> u32 {
        30
    }
    // The Argon2 work factor the password store has always run with.
    pub fn argon2_memory_kib() -> u32 {
        15000
    }
    pub fn argon2_iterations() -> u32 {
        2
    }
    pub fn argon2_parallelism() -> u32 {
        1
    }
    pub fn postmark_base_url() -> String {
        "https://api.postmarkapp.com/".to_string()
    }
    pub fn email_timeout_millis() -> u64 {
        10_000
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings: Settings = Config::builder()
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;

        if settings.jwt_secret.expose_secret().len() < MIN_SIGNING_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT_SECRET must be at least {MIN_SIGNING_SECRET_LENGTH} characters"
            )));
        }

        Ok(settings)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            mode: self.app_env,
            access_token_ttl_minutes: self.access_token_ttl_minutes,
            refresh_token_ttl_days: self.refresh_token_ttl_days,
            otp_ttl_minutes: self.otp_ttl_minutes,
            otp_attempt_limit: self.otp_attempt_limit,
            otp_send_window_seconds: self.otp_send_window_seconds,
            otp_send_max: self.otp_send_max,
        }
    }
}
