use serde_json::{Value, json};
use uuid::Uuid;

use crate::helpers::spawn_app;

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

#[tokio::test]
async fn full_auth_flow_end_to_end() {
    let app = spawn_app().await;
    let email = unique_email();

    // Register: the account id comes back, and test mode echoes the code.
    let register = app
        .post(
            "/auth/register",
            &json!({ "email": email, "password": "Password123", "name": "Test User" }),
        )
        .await;
    assert_eq!(register.status(), 200);
    let register_body: Value = register.json().await.unwrap();
    assert!(register_body["userId"].is_string());
    let otp = register_body["otp"].as_str().unwrap().to_string();
    assert_eq!(app.store.audit_events().await.len(), 1);

    // Verify the registration code.
    let verify = app
        .post(
            "/auth/verify-otp",
            &json!({ "email": email, "code": otp, "type": "register" }),
        )
        .await;
    assert_eq!(verify.status(), 200);
    let verify_body: Value = verify.json().await.unwrap();
    assert_eq!(verify_body["isVerified"], json!(true));

    // A wrong password is rejected and still audited.
    let wrong = app
        .post(
            "/auth/login",
            &json!({ "email": email, "password": "WrongPass123" }),
        )
        .await;
    assert_eq!(wrong.status(), 401);
    let failed_count = app
        .store
        .audit_events()
        .await
        .iter()
        .filter(|event| event.event_type == "auth.login_failed")
        .count();
    assert_eq!(failed_count, 1);

    // Log in for real.
    let login = app
        .post(
            "/auth/login",
            &json!({ "email": email, "password": "Password123" }),
        )
        .await;
    assert_eq!(login.status(), 200);
    let login_body: Value = login.json().await.unwrap();
    let refresh_token = login_body["refreshToken"].as_str().unwrap().to_string();
    assert!(login_body["accessToken"].is_string());
    assert_eq!(login_body["expiresIn"], json!(15 * 60));
    assert_eq!(app.store.sessions().await.len(), 1);

    // Rotate the refresh token.
    let refresh = app
        .post("/auth/refresh", &json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(refresh.status(), 200);
    let refresh_body: Value = refresh.json().await.unwrap();
    let rotated = refresh_body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh_token);

    // The rotated-away token is dead.
    let reuse = app
        .post("/auth/refresh", &json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(reuse.status(), 401);

    // Password reset: request, confirm, old password dead, new one works.
    let reset_request = app
        .post("/auth/password/request", &json!({ "email": email }))
        .await;
    assert_eq!(reset_request.status(), 200);
    let reset_body: Value = reset_request.json().await.unwrap();
    let reset_otp = reset_body["otp"].as_str().unwrap().to_string();

    let reset = app
        .post(
            "/auth/password/reset",
            &json!({ "email": email, "code": reset_otp, "newPassword": "NewPassword123" }),
        )
        .await;
    assert_eq!(reset.status(), 200);

    let old_login = app
        .post(
            "/auth/login",
            &json!({ "email": email, "password": "Password123" }),
        )
        .await;
    assert_eq!(old_login.status(), 401);

    let new_login = app
        .post(
            "/auth/login",
            &json!({ "email": email, "password": "NewPassword123" }),
        )
        .await;
    assert_eq!(new_login.status(), 200);
}

#[tokio::test]
async fn duplicate_registration_returns_409() {
    let app = spawn_app().await;
    let email = unique_email();
    let body = json!({ "email": email, "password": "Password123", "name": "First" });

    assert_eq!(app.post("/auth/register", &body).await.status(), 200);
    let second = app.post("/auth/register", &body).await;
    assert_eq!(second.status(), 409);
    let second_body: Value = second.json().await.unwrap();
    assert_eq!(second_body["code"], json!("USER_EXISTS"));
}

#[tokio::test]
async fn malformed_input_returns_422() {
    let app = spawn_app().await;

    let bad_email = app
        .post(
            "/auth/register",
            &json!({ "email": "not-an-email", "password": "Password123", "name": "X" }),
        )
        .await;
    assert_eq!(bad_email.status(), 422);

    let short_password = app
        .post(
            "/auth/register",
            &json!({ "email": unique_email(), "password": "short", "name": "X" }),
        )
        .await;
    assert_eq!(short_password.status(), 422);

    let bad_code = app
        .post(
            "/auth/verify-otp",
            &json!({ "email": unique_email(), "code": "12", "type": "register" }),
        )
        .await;
    assert_eq!(bad_code.status(), 422);
}

#[tokio::test]
async fn send_otp_is_rate_limited() {
    let app = spawn_app().await;
    let email = unique_email();
    app.post(
        "/auth/register",
        &json!({ "email": email, "password": "Password123", "name": "Limited" }),
    )
    .await;

    for _ in 0..3 {
        let resend = app
            .post(
                "/auth/send-otp",
                &json!({ "email": email, "type": "register" }),
            )
            .await;
        assert_eq!(resend.status(), 200);
    }

    let blocked = app
        .post(
            "/auth/send-otp",
            &json!({ "email": email, "type": "register" }),
        )
        .await;
    assert_eq!(blocked.status(), 429);
    let blocked_body: Value = blocked.json().await.unwrap();
    assert_eq!(blocked_body["code"], json!("RATE_LIMITED"));
}

#[tokio::test]
async fn unknown_account_returns_404_for_otp_flows() {
    let app = spawn_app().await;

    let send = app
        .post(
            "/auth/send-otp",
            &json!({ "email": unique_email(), "type": "register" }),
        )
        .await;
    assert_eq!(send.status(), 404);

    let reset = app
        .post("/auth/password/request", &json!({ "email": unique_email() }))
        .await;
    assert_eq!(reset.status(), 404);
}

#[tokio::test]
async fn unverified_account_cannot_log_in() {
    let app = spawn_app().await;
    let email = unique_email();
    app.post(
        "/auth/register",
        &json!({ "email": email, "password": "Password123", "name": "Unverified" }),
    )
    .await;

    let login = app
        .post(
            "/auth/login",
            &json!({ "email": email, "password": "Password123" }),
        )
        .await;
    assert_eq!(login.status(), 403);
    let body: Value = login.json().await.unwrap();
    assert_eq!(body["code"], json!("USER_NOT_VERIFIED"));
}

#[tokio::test]
async fn garbage_refresh_token_is_unauthorized() {
    let app = spawn_app().await;
    let refresh = app
        .post("/auth/refresh", &json!({ "refreshToken": "not-a-real-token" }))
        .await;
    assert_eq!(refresh.status(), 401);
    let body: Value = refresh.json().await.unwrap();
    assert_eq!(body["code"], json!("SESSION_INVALID"));
}
