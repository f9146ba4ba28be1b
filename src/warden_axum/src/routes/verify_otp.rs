use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use warden_application::{AuthEngine, VerifyOtpRequest};
use warden_core::{CredentialStore, Email, EmailClient, OtpCode, OtpPurpose, RateLimiter};

use crate::{error::ApiError, extract::origin_from_headers};

use super::send_otp::default_purpose;

#[derive(Deserialize)]
pub struct VerifyOtpBody {
    pub email: Secret<String>,
    pub code: String,
    #[serde(rename = "type", default = "default_purpose")]
    pub purpose: OtpPurpose,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpReply {
    pub message: String,
    #[serde(rename = "isVerified", skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

#[tracing::instrument(name = "Verify OTP", skip_all)]
pub async fn verify_otp<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    headers: HeaderMap,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<VerifyOtpReply>, ApiError>
where
    S: CredentialStore + 'static,
    R: RateLimiter + 'static,
    M: EmailClient + 'static,
{
    let origin = origin_from_headers(&headers);
    let email =
        Email::try_from(body.email).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    let code = OtpCode::parse(body.code).map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let outcome = engine
        .verify_otp(
            VerifyOtpRequest {
                email,
                code,
                purpose: body.purpose,
            },
            origin,
        )
        .await?;

    Ok(Json(VerifyOtpReply {
        message: outcome.message,
        is_verified: outcome.is_verified,
    }))
}
