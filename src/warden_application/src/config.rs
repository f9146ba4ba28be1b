use warden_core::AppMode;

/// Read-only engine configuration, fixed at startup. TTLs and ceilings are
/// the knobs of the OTP and session state machines; nothing here mutates at
/// runtime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub mode: AppMode,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub otp_ttl_minutes: i64,
    pub otp_attempt_limit: i32,
    pub otp_send_window_seconds: u64,
    pub otp_send_max: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: AppMode::Development,
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            otp_ttl_minutes: 10,
            otp_attempt_limit: 5,
            otp_send_window_seconds: 60,
            otp_send_max: 3,
        }
    }
}

impl EngineConfig {
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_minutes * 60
    }
}
