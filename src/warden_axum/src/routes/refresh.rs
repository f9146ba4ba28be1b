use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;

use warden_application::{AuthEngine, RefreshRequest};
use warden_core::{CredentialStore, EmailClient, RateLimiter};

use crate::error::ApiError;

use super::login::TokenReply;

#[derive(Deserialize)]
pub struct RefreshBody {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[tracing::instrument(name = "Refresh session", skip_all)]
pub async fn refresh<S, R, M>(
    State(engine): State<Arc<AuthEngine<S, R, M>>>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<TokenReply>, ApiError>
where
    S: CredentialStore + 'static,
    R: RateLimiter + 'static,
    M: EmailClient + 'static,
{
    let grant = engine
        .refresh(RefreshRequest {
            refresh_token: body.refresh_token,
        })
        .await?;
    Ok(Json(grant.into()))
}
