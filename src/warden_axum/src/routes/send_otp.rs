use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use warden_application::{AuthEngine, SendOtpRequest};
use warden_core::{CredentialStore, Email, EmailClient, OtpPurpose, RateLimiter};

use crate::{error::ApiError, extract::origin_from_headers};

pub(crate) fn default_purpose() -> OtpPurpose {
    OtpPurpose::Register
}

#[derive(Deserialize)]
pub struct SendOtpBody {
    pub email: Secret<String>,
    #[serde(rename = "type", default = "default_purpose")]
    pub purpose: OtpPurpose,
}

#[derive(Debug, Serialize)]
pub struct SendOtpReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[tracing::instrument(name = "Send OTP", skip_all)]
pub async fn send_otp<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    headers: HeaderMap,
    Json(body): Json<SendOtpBody>,
) -> Result<Json<SendOtpReply>, ApiError>
where
    S: CredentialStore + 'static,
    R: RateLimiter + 'static,
    M: EmailClient + 'static,
{
    let origin = origin_from_headers(&headers);
    let email =
        Email::try_from(body.email).map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let outcome = engine
        .send_otp(
            SendOtpRequest {
                email,
                purpose: body.purpose,
            },
            origin,
        )
        .await?;

    Ok(Json(SendOtpReply {
        message: outcome.message,
        otp: outcome.otp.map(|code| code.as_str().to_string()),
    }))
}
