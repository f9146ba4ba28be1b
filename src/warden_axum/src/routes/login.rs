use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use warden_application::{AuthEngine, LoginRequest, TokenGrant};
use warden_core::{CredentialStore, Email, EmailClient, Password, RateLimiter};

use crate::{error::ApiError, extract::origin_from_headers};

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenReply {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

impl From<TokenGrant> for TokenReply {
    fn from(grant: TokenGrant) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
        }
    }
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Result<Json<TokenReply>, ApiError>
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

    let grant = engine.login(LoginRequest { email, password }, origin).await?;
    Ok(Json(grant.into()))
}
