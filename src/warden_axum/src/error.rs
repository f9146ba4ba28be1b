use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use warden_core::{AuthError, AuthErrorKind};

/// Boundary-layer failure: a taxonomy kind with its fixed transport status,
/// or an opaque internal error. Nothing beyond the kind and message ever
/// reaches the caller.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Request shape rejected before it reached the core.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: status_for(AuthErrorKind::Unprocessable),
            code: AuthErrorKind::Unprocessable.code(),
            message: message.into(),
        }
    }
}

fn status_for(kind: AuthErrorKind) -> StatusCode {
    match kind {
        AuthErrorKind::UserExists => StatusCode::CONFLICT,
        AuthErrorKind::UserNotFound => StatusCode::NOT_FOUND,
        AuthErrorKind::UserNotVerified => StatusCode::FORBIDDEN,
        AuthErrorKind::InvalidCredentials | AuthErrorKind::SessionInvalid => {
            StatusCode::UNAUTHORIZED
        }
        AuthErrorKind::OtpInvalid | AuthErrorKind::OtpExpired => StatusCode::BAD_REQUEST,
        AuthErrorKind::OtpAttemptsExceeded | AuthErrorKind::RateLimited => {
            StatusCode::TOO_MANY_REQUESTS
        }
        AuthErrorKind::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error.kind() {
            Some(kind) => Self {
                status: status_for(kind),
                code: kind.code(),
                message: error.to_string(),
            },
            None => {
                tracing::error!(error = %error, "internal error during auth operation");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "INTERNAL",
                    message: "Something went wrong".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message, "code": self.code }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_kinds_keep_their_status_mapping() {
        let cases = [
            (AuthErrorKind::UserExists, StatusCode::CONFLICT),
            (AuthErrorKind::UserNotFound, StatusCode::NOT_FOUND),
            (AuthErrorKind::UserNotVerified, StatusCode::FORBIDDEN),
            (AuthErrorKind::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthErrorKind::OtpInvalid, StatusCode::BAD_REQUEST),
            (AuthErrorKind::OtpExpired, StatusCode::BAD_REQUEST),
            (
                AuthErrorKind::OtpAttemptsExceeded,
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AuthErrorKind::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (AuthErrorKind::SessionInvalid, StatusCode::UNAUTHORIZED),
            (AuthErrorKind::Unprocessable, StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (kind, status) in cases {
            assert_eq!(status_for(kind), status, "{:?}", kind);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let error = AuthError::Store(warden_core::StoreError::Unexpected(
            "connection reset by peer".to_string(),
        ));
        let api: ApiError = error.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("connection reset"));
    }
}
