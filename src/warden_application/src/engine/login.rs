use warden_core::{
    AuthError, AuditEvent, CredentialStore, CredentialTx, Email, EmailClient, LoginFailureReason,
    Password, RateLimiter, RequestOrigin,
};

use super::AuthEngine;

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: Email,
    pub password: Password,
}

/// A freshly minted access/refresh pair. `expires_in` is the access-token
/// lifetime in seconds.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    /// Password login.
    ///
    /// Unknown account and wrong password are indistinguishable to the
    /// caller; the audit trail records which one it was. The verified check
    /// runs only after the password matched, so the flag cannot be probed
    /// without valid credentials. Failed attempts commit their audit record
    /// before the failure returns.
    #[tracing::instrument(name = "AuthEngine::login", skip_all)]
    pub async fn login(
        &self,
        request: LoginRequest,
        origin: RequestOrigin,
    ) -> Result<TokenGrant, AuthError> {
        let mut tx = self.store().begin().await?;

        let Some(account) = tx.find_account_by_email(&request.email).await? else {
            tx.append_audit(
                None,
                &AuditEvent::LoginFailed {
                    email: Some(Self::exposed_email(&request.email)),
                    reason: LoginFailureReason::UnknownAccount,
                },
                &origin,
                self.now(),
            )
            .await?;
            tx.commit().await?;
            return Err(AuthError::InvalidCredentials);
        };

        let password_ok = self
            .hasher()
            .verify(
                request.password.as_ref().clone(),
                account.password_hash.clone(),
            )
            .await?;
        if !password_ok {
            tx.append_audit(
                Some(account.id),
                &AuditEvent::LoginFailed {
                    email: None,
                    reason: LoginFailureReason::InvalidPassword,
                },
                &origin,
                self.now(),
            )
            .await?;
            tx.commit().await?;
            return Err(AuthError::InvalidCredentials);
        }

        if !account.verified {
            return Err(AuthError::UserNotVerified);
        }

        let grant = self.open_session(&mut tx, account.id).await?;
        tx.append_audit(Some(account.id), &AuditEvent::LoginSucceeded, &origin, self.now())
            .await?;
        tx.commit().await?;

        Ok(grant)
    }
}
