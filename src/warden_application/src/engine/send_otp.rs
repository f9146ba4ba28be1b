use secrecy::ExposeSecret;

use warden_core::{
    AuthError, AuditEvent, CredentialStore, CredentialTx, Email, EmailClient, OtpCode, OtpPurpose,
    RateLimiter, RequestOrigin,
};

use super::AuthEngine;

#[derive(Debug, Clone)]
pub struct SendOtpRequest {
    pub email: Email,
    pub purpose: OtpPurpose,
}

#[derive(Debug)]
pub struct SendOtpOutcome {
    pub message: String,
    pub otp: Option<OtpCode>,
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    /// Re-issues the OTP for an existing account, superseding the prior one.
    /// Rate limited per (purpose, email) before any transaction is opened.
    #[tracing::instrument(name = "AuthEngine::send_otp", skip_all)]
    pub async fn send_otp(
        &self,
        request: SendOtpRequest,
        origin: RequestOrigin,
    ) -> Result<SendOtpOutcome, AuthError> {
        let key = format!(
            "otp:{}:{}",
            request.purpose,
            request.email.as_ref().expose_secret()
        );
        let allowed = self
            .rate_limiter()
            .consume(
                &key,
                self.config().otp_send_max,
                self.config().otp_send_window_seconds,
            )
            .await?;
        if !allowed {
            return Err(AuthError::RateLimited);
        }

        let mut tx = self.store().begin().await?;
        let Some(account) = tx.find_account_by_email(&request.email).await? else {
            return Err(AuthError::UserNotFound);
        };

        let code = self.issue_otp(&mut tx, account.id, request.purpose).await?;
        tx.append_audit(
            Some(account.id),
            &AuditEvent::OtpSent {
                purpose: request.purpose,
            },
            &origin,
            self.now(),
        )
        .await?;
        tx.commit().await?;

        self.dispatch_code(&request.email, &code, request.purpose)
            .await;

        Ok(SendOtpOutcome {
            message: "OTP sent".to_string(),
            otp: self.echoed_code(code),
        })
    }
}
