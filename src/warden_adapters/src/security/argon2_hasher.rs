use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher, SaltString, rand_core},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use warden_core::{HashError, SecretHasher};

/// Argon2id hasher for passwords, OTP codes, and refresh tokens.
///
/// The work factor is fixed at construction. Hashing runs on the blocking
/// pool so a burst of logins cannot stall the async executor.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashError::Unexpected(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[async_trait]
impl SecretHasher for Argon2Hasher {
    #[tracing::instrument(name = "Computing Argon2 hash", skip_all)]
    async fn hash(&self, secret: Secret<String>) -> Result<Secret<String>, HashError> {
        let hasher = self.argon2();
        let current_span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let salt = SaltString::generate(rand_core::OsRng);
                hasher
                    .hash_password(secret.expose_secret().as_bytes(), &salt)
                    .map(|hash| Secret::from(hash.to_string()))
                    .map_err(|e| HashError::Unexpected(e.to_string()))
            })
        })
        .await
        .map_err(|e| HashError::Unexpected(e.to_string()))?
    }

    #[tracing::instrument(name = "Verifying Argon2 hash", skip_all)]
    async fn verify(
        &self,
        candidate: Secret<String>,
        expected_hash: Secret<String>,
    ) -> Result<bool, HashError> {
        let hasher = self.argon2();
        let current_span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected = PasswordHash::new(expected_hash.expose_secret())
                    .map_err(|e| HashError::Unexpected(e.to_string()))?;
                match hasher.verify_password(candidate.expose_secret().as_bytes(), &expected) {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(HashError::Unexpected(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| HashError::Unexpected(e.to_string()))?
    }
}

/// Constant-time byte comparison for two secrets compared directly.
///
/// Not used for the hashed comparisons above; those are constant-time by
/// construction of the verify primitive. Scans to the longer length before
/// the length check so early exits reveal nothing.
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = 0u8;
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= x ^ y;
    }
    diff == 0 && a.len() == b.len()
}
