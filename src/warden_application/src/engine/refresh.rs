use secrecy::Secret;

use warden_core::{
    AuthError, AuditEvent, CredentialStore, CredentialTx, EmailClient, RateLimiter, RequestOrigin,
    TokenClass,
};

use super::{AuthEngine, login::TokenGrant};

#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    /// Rotates a refresh token: the presented token's session is revoked and
    /// a new pair is minted. Reuse of an already-rotated token finds no
    /// active session and fails, which is what makes each token single-use.
    #[tracing::instrument(name = "AuthEngine::refresh", skip_all)]
    pub async fn refresh(&self, request: RefreshRequest) -> Result<TokenGrant, AuthError> {
        let claims = self
            .token_issuer()
            .verify(&request.refresh_token, TokenClass::Refresh)
            .map_err(|_| AuthError::SessionInvalid)?;

        let mut tx = self.store().begin().await?;
        let now = self.now();

        // The raw token is never stored, so the owning session is found by
        // re-verifying the supplied token against each persisted hash.
        let mut matched = None;
        for session in tx.active_sessions(claims.account_id, now).await? {
            let hash = session.refresh_token_hash.clone();
            if self
                .hasher()
                .verify(Secret::from(request.refresh_token.clone()), hash)
                .await?
            {
                matched = Some(session);
                break;
            }
        }
        let Some(session) = matched else {
            return Err(AuthError::SessionInvalid);
        };

        tx.revoke_session(session.id, now).await?;
        let grant = self.open_session(&mut tx, claims.account_id).await?;
        tx.append_audit(
            Some(claims.account_id),
            &AuditEvent::SessionRefreshed,
            &RequestOrigin::default(),
            self.now(),
        )
        .await?;
        tx.commit().await?;

        Ok(grant)
    }
}
