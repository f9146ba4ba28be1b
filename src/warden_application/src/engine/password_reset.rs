use warden_core::{
    AuthError, AuditEvent, CredentialStore, CredentialTx, Email, EmailClient, OtpCode, OtpPurpose,
    Password, RateLimiter, RequestOrigin,
};

use super::{AuthEngine, OtpVerdict};

#[derive(Debug, Clone)]
pub struct PasswordResetRequest {
    pub email: Email,
}

#[derive(Debug)]
pub struct ResetRequestOutcome {
    pub message: String,
    pub otp: Option<OtpCode>,
}

#[derive(Debug, Clone)]
pub struct PasswordResetConfirm {
    pub email: Email,
    pub code: OtpCode,
    pub new_password: Password,
}

#[derive(Debug)]
pub struct PasswordResetOutcome {
    pub message: String,
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    /// Issues a `password_reset` OTP, superseding any outstanding one.
    #[tracing::instrument(name = "AuthEngine::request_password_reset", skip_all)]
    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
        origin: RequestOrigin,
    ) -> Result<ResetRequestOutcome, AuthError> {
        let mut tx = self.store().begin().await?;
        let Some(account) = tx.find_account_by_email(&request.email).await? else {
            return Err(AuthError::UserNotFound);
        };

        let code = self
            .issue_otp(&mut tx, account.id, OtpPurpose::PasswordReset)
            .await?;
        tx.append_audit(
            Some(account.id),
            &AuditEvent::PasswordResetRequested,
            &origin,
            self.now(),
        )
        .await?;
        tx.commit().await?;

        self.dispatch_code(&request.email, &code, OtpPurpose::PasswordReset)
            .await;

        Ok(ResetRequestOutcome {
            message: "Password reset OTP sent".to_string(),
            otp: self.echoed_code(code),
        })
    }

    /// Confirms a reset: same OTP state machine as `verify_otp`, then the
    /// password hash is rewritten and every active session is revoked, a
    /// forced global logout.
    #[tracing::instrument(name = "AuthEngine::reset_password", skip_all)]
    pub async fn reset_password(
        &self,
        request: PasswordResetConfirm,
        origin: RequestOrigin,
    ) -> Result<PasswordResetOutcome, AuthError> {
        let mut tx = self.store().begin().await?;
        let Some(account) = tx.find_account_by_email(&request.email).await? else {
            return Err(AuthError::UserNotFound);
        };

        match self
            .check_and_consume_otp(
                &mut tx,
                account.id,
                OtpPurpose::PasswordReset,
                &request.code,
            )
            .await?
        {
            OtpVerdict::Rejected(failure) => {
                tx.commit().await?;
                return Err(failure);
            }
            OtpVerdict::Verified => {}
        }

        let password_hash = self
            .hasher()
            .hash(request.new_password.as_ref().clone())
            .await?;
        let now = self.now();
        tx.update_password_hash(account.id, password_hash, now).await?;

        for session in tx.active_sessions(account.id, now).await? {
            tx.revoke_session(session.id, now).await?;
        }

        tx.append_audit(
            Some(account.id),
            &AuditEvent::PasswordResetCompleted,
            &origin,
            now,
        )
        .await?;
        tx.commit().await?;

        Ok(PasswordResetOutcome {
            message: "Password updated".to_string(),
        })
    }
}
