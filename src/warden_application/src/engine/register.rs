use uuid::Uuid;

use warden_core::{
    AuthError, AuditEvent, CredentialStore, CredentialTx, Email, EmailClient, NewAccount, OtpCode,
    OtpPurpose, Password, RateLimiter, RequestOrigin, StoreError,
};

use super::AuthEngine;

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: Email,
    pub password: Password,
    pub name: String,
}

#[derive(Debug)]
pub struct RegisterOutcome {
    pub account_id: Uuid,
    pub message: String,
    /// Only present outside production mode.
    pub otp: Option<OtpCode>,
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    /// Creates an unverified account and issues its `register` OTP.
    ///
    /// The uniqueness race between concurrent registrations for the same
    /// email is settled by the store's constraint, not the pre-check; the
    /// pre-check only exists to fail fast without hashing a password.
    #[tracing::instrument(name = "AuthEngine::register", skip_all)]
    pub async fn register(
        &self,
        request: RegisterRequest,
        origin: RequestOrigin,
    ) -> Result<RegisterOutcome, AuthError> {
        let mut tx = self.store().begin().await?;

        if tx.find_account_by_email(&request.email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.hasher().hash(request.password.as_ref().clone()).await?;
        let account = tx
            .insert_account(
                NewAccount {
                    email: request.email.clone(),
                    password_hash,
                    name: request.name,
                },
                self.now(),
            )
            .await
            .map_err(|e| match e {
                StoreError::EmailTaken => AuthError::UserExists,
                other => AuthError::from(other),
            })?;

        let code = self.issue_otp(&mut tx, account.id, OtpPurpose::Register).await?;
        tx.append_audit(
            Some(account.id),
            &AuditEvent::Registered {
                email: Self::exposed_email(&request.email),
            },
            &origin,
            self.now(),
        )
        .await?;
        tx.commit().await?;

        self.dispatch_code(&request.email, &code, OtpPurpose::Register)
            .await;

        Ok(RegisterOutcome {
            account_id: account.id,
            message: "Registration successful. OTP sent.".to_string(),
            otp: self.echoed_code(code),
        })
    }
}
