use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use warden_application::AuthEngine;
use warden_axum::routes::{
    login, refresh, register, request_password_reset, reset_password, send_otp, verify_otp,
};
use warden_core::{CredentialStore, EmailClient, RateLimiter};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// The assembled credential service: the seven auth routes over one engine.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    /// Wires the route table to the provided engine. The engine is shared
    /// behind an `Arc`; every route gets the same instance.
    pub fn new<S, R, M>(engine: AuthEngine<S, R, M>) -> Self
    where
        S: CredentialStore + 'static,
        R: RateLimiter + 'static,
        M: EmailClient + 'static,
    {
        let engine = Arc::new(engine);
        let router = Router::new()
            .route("/auth/register", post(register::<S, R, M>))
            .route("/auth/send-otp", post(send_otp::<S, R, M>))
            .route("/auth/verify-otp", post(verify_otp::<S, R, M>))
            .route("/auth/login", post(login::<S, R, M>))
            .route("/auth/refresh", post(refresh::<S, R, M>))
            .route(
                "/auth/password/request",
                post(request_password_reset::<S, R, M>),
            )
            .route("/auth/password/reset", post(reset_password::<S, R, M>))
            .with_state(engine);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Finishes the router, optionally restricted to the given CORS origins,
    /// so it can be served standalone or nested into a larger application.
    pub fn into_router(mut self, allowed_origins: Option<Vec<HeaderValue>>) -> Router {
        if let Some(origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::list(origins));
            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Runs the auth service as a standalone server.
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<Vec<HeaderValue>>,
    ) -> Result<(), std::io::Error> {
        let router = self.into_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum::serve(listener, router.into_make_service()).await
    }
}
