use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use warden_application::{AuthEngine, PasswordResetConfirm};
use warden_core::{CredentialStore, Email, EmailClient, OtpCode, Password, RateLimiter};

use crate::{error::ApiError, extract::origin_from_headers};

#[derive(Deserialize)]
pub struct PasswordResetConfirmBody {
    pub email: Secret<String>,
    pub code: String,
    #[serde(rename = "newPassword")]
    pub new_password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetConfirmReply {
    pub message: String,
}

#[tracing::instrument(name = "Confirm password reset", skip_all)]
pub async fn reset_password<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    headers: HeaderMap,
    Json(body): Json<PasswordResetConfirmBody>,
) -> Result<Json<PasswordResetConfirmReply>, ApiError>
where
    S: CredentialStore + 'static,
    R: RateLimiter + 'static,
    M: EmailClient + 'static,
{
    let origin = origin_from_headers(&headers);
    let email =
        Email::try_from(body.email).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    let code = OtpCode::parse(body.code).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    let new_password = Password::try_from(body.new_password)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let outcome = engine
        .reset_password(
            PasswordResetConfirm {
                email,
                code,
                new_password,
            },
            origin,
        )
        .await?;

    Ok(Json(PasswordResetConfirmReply {
        message: outcome.message,
    }))
}
