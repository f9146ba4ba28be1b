use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_application::{AuthEngine, RegisterRequest};
use warden_core::{CredentialStore, Email, EmailClient, Password, RateLimiter};

use crate::{error::ApiError, extract::origin_from_headers};

const MAX_NAME_LENGTH: usize = 255;

#[derive(Deserialize)]
pub struct RegisterBody {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterReply {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    headers: HeaderMap,
    Json(body): Json<RegisterBody>,
) -> Result<Json<RegisterReply>, ApiError>
where
    S: CredentialStore + 'static,
    R: RateLimiter + 'static,
    M: EmailClient + 'static,
{
    let origin = origin_from_headers(&headers);
    let email =
        Email::try_from(body.email).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    let password =
        Password::try_from(body.password).map_err(|e| ApiError::unprocessable(e.to_string()))?;
    if body.name.is_empty() || body.name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::unprocessable("Name must be 1-255 characters"));
    }

    let outcome = engine
        .register(
            RegisterRequest {
                email,
                password,
                name: body.name,
            },
            origin,
        )
        .await?;

    Ok(Json(RegisterReply {
        user_id: outcome.account_id,
        message: outcome.message,
        otp: outcome.otp.map(|code| code.as_str().to_string()),
    }))
}
