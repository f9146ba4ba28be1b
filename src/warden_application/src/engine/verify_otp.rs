use warden_core::{
    AuthError, AuditEvent, CredentialStore, CredentialTx, Email, EmailClient, OtpCode, OtpPurpose,
    RateLimiter, RequestOrigin,
};

use super::{AuthEngine, OtpVerdict};

#[derive(Debug, Clone)]
pub struct VerifyOtpRequest {
    pub email: Email,
    pub code: OtpCode,
    pub purpose: OtpPurpose,
}

#[derive(Debug)]
pub struct VerifyOtpOutcome {
    pub message: String,
    /// `Some(true)` only when a `register` code was verified.
    pub is_verified: Option<bool>,
}

impl<S, R, M> AuthEngine<S, R, M>
where
    S: CredentialStore,
    R: RateLimiter,
    M: EmailClient,
{
    /// Verifies the outstanding code for (account, purpose).
    ///
    /// Rejections commit before returning: the attempt counter and terminal
    /// consumption must survive the failed call, otherwise the ceiling could
    /// be probed forever.
    #[tracing::instrument(name = "AuthEngine::verify_otp", skip_all)]
    pub async fn verify_otp(
        &self,
        request: VerifyOtpRequest,
        origin: RequestOrigin,
    ) -> Result<VerifyOtpOutcome, AuthError> {
        let mut tx = self.store().begin().await?;
        let Some(account) = tx.find_account_by_email(&request.email).await? else {
            return Err(AuthError::UserNotFound);
        };

        match self
            .check_and_consume_otp(&mut tx, account.id, request.purpose, &request.code)
            .await?
        {
            OtpVerdict::Rejected(failure) => {
                tx.commit().await?;
                return Err(failure);
            }
            OtpVerdict::Verified => {}
        }

        let now = self.now();
        if request.purpose == OtpPurpose::Register && !account.verified {
            tx.mark_account_verified(account.id, now).await?;
        }

        let event = match request.purpose {
            OtpPurpose::PasswordReset => AuditEvent::PasswordResetVerified,
            OtpPurpose::Register => AuditEvent::OtpVerified {
                purpose: request.purpose,
            },
        };
        tx.append_audit(Some(account.id), &event, &origin, now).await?;
        tx.commit().await?;

        Ok(VerifyOtpOutcome {
            message: "OTP verified".to_string(),
            is_verified: (request.purpose == OtpPurpose::Register).then_some(true),
        })
    }
}
