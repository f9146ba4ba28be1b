pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::{
    AuthEngine, LoginRequest, PasswordResetConfirm, PasswordResetOutcome, PasswordResetRequest,
    RefreshRequest, RegisterOutcome, RegisterRequest, ResetRequestOutcome, SendOtpOutcome,
    SendOtpRequest, TokenGrant, VerifyOtpOutcome, VerifyOtpRequest,
};
