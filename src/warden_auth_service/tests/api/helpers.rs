use std::sync::Arc;

use secrecy::Secret;
use serde_json::Value;
use tokio::net::TcpListener;

use warden_adapters::{
    Argon2Hasher, InMemoryCredentialStore, JwtTokenIssuer, LocalRateLimiter, RandomCodeSource,
    RecordingEmailClient, SystemClock,
};
use warden_application::{AuthEngine, EngineConfig};
use warden_auth_service::AuthService;
use warden_core::{AppMode, Clock};

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: InMemoryCredentialStore,
}

/// Boots the full HTTP service on an ephemeral port, backed by the
/// in-memory store, a recording mailer, and a fast hash work factor.
pub async fn spawn_app() -> TestApp {
    let store = InMemoryCredentialStore::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = EngineConfig {
        mode: AppMode::Test,
        ..EngineConfig::default()
    };

    let engine = AuthEngine::new(
        store.clone(),
        LocalRateLimiter::new(clock.clone()),
        RecordingEmailClient::new(),
        Arc::new(Argon2Hasher::new(1024, 1, 1).unwrap()),
        Arc::new(JwtTokenIssuer::new(
            &Secret::from("api-test-signing-secret".to_string()),
            config.access_token_ttl_minutes,
            config.refresh_token_ttl_days,
            clock.clone(),
        )),
        clock,
        Arc::new(RandomCodeSource),
        config,
    );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(AuthService::new(engine).run_standalone(listener, None));

    TestApp {
        address,
        client: reqwest::Client::new(),
        store,
    }
}

impl TestApp {
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("request failed")
    }
}
