pub mod config;
pub mod email;
pub mod persistence;
pub mod rate_limit;
pub mod runtime;
pub mod security;

pub use config::Settings;
pub use email::{LogEmailClient, PostmarkEmailClient, RecordingEmailClient, SentEmail};
pub use persistence::{
    AuditRecord, InMemoryCredentialStore, PostgresCredentialStore,
};
pub use rate_limit::{LocalRateLimiter, PostgresRateLimiter};
pub use runtime::{FixedCodeSource, ManualClock, RandomCodeSource, SystemClock};
pub use security::{Argon2Hasher, JwtTokenIssuer, secure_compare};
