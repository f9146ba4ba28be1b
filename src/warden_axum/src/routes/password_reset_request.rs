use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use warden_application::{AuthEngine, PasswordResetRequest};
use warden_core::{CredentialStore, Email, EmailClient, RateLimiter};

use crate::{error::ApiError, extract::origin_from_headers};

#[derive(Deserialize)]
pub struct PasswordResetRequestBody {
    pub email: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetRequestReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[tracing::instrument(name = "Request password reset", skip_all)]
pub async fn request_password_reset<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    headers: HeaderMap,
    Json(body): Json<PasswordResetRequestBody>,
) -> Result<Json<PasswordResetRequestReply>, ApiError>
where
    S: CredentialStore + 'static,
    R: RateLimiter + 'static,
    M: EmailClient + 'static,
{
    let origin = origin_from_headers(&headers);
    let email =
        Email::try_from(body.email).map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let outcome = engine
        .request_password_reset(PasswordResetRequest { email }, origin)
        .await?;

    Ok(Json(PasswordResetRequestReply {
        message: outcome.message,
        otp: outcome.otp.map(|code| code.as_str().to_string()),
    }))
}
