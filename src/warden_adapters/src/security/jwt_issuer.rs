use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::{Clock, TokenClaims, TokenClass, TokenError, TokenIssuer};

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    iat: i64,
    exp: i64,
    /// Unique per token, so two tokens minted in the same second for the
    /// same subject never collide.
    jti: String,
    #[serde(rename = "type")]
    class: TokenClass,
}

/// HS256-signed access and refresh tokens.
///
/// The class claim keeps the two populations apart: verification demands
/// the expected class and fails closed on any signature, expiry, or claim
/// problem.
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    pub fn new(
        secret: &Secret<String>,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
            clock,
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, account_id: Uuid, class: TokenClass) -> Result<String, TokenError> {
        let now = self.clock.now();
        let ttl = match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
        };
        let claims = JwtClaims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            class,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenClass) -> Result<TokenClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| TokenError::Verification)?;
        if data.claims.class != expected {
            return Err(TokenError::Verification);
        }
        let account_id =
            Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Verification)?;
        Ok(TokenClaims {
            account_id,
            class: data.claims.class,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::runtime::{ManualClock, SystemClock};

    use super::*;

    fn issuer() -> JwtTokenIssuer {
        JwtTokenIssuer::new(
            &Secret::from("test-signing-secret".to_string()),
            15,
            7,
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let issuer = issuer();
        let account_id = Uuid::new_v4();

        let token = issuer.issue(account_id, TokenClass::Access).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer.verify(&token, TokenClass::Access).unwrap();
        assert_eq!(claims.account_id, account_id);
        assert_eq!(claims.class, TokenClass::Access);
    }

    #[test]
    fn refresh_token_is_rejected_where_access_is_expected() {
        let issuer = issuer();
        let token = issuer.issue(Uuid::new_v4(), TokenClass::Refresh).unwrap();

        assert!(matches!(
            issuer.verify(&token, TokenClass::Access),
            Err(TokenError::Verification)
        ));
        assert!(issuer.verify(&token, TokenClass::Refresh).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let past = ManualClock::starting_at(Utc::now() - Duration::days(2));
        let issuer = JwtTokenIssuer::new(
            &Secret::from("test-signing-secret".to_string()),
            15,
            1,
            Arc::new(past),
        );
        let token = issuer.issue(Uuid::new_v4(), TokenClass::Refresh).unwrap();

        assert!(matches!(
            issuer.verify(&token, TokenClass::Refresh),
            Err(TokenError::Verification)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue(Uuid::new_v4(), TokenClass::Access).unwrap();
        let tampered = format!("{}x", token);

        assert!(issuer.verify(&tampered, TokenClass::Access).is_err());
        assert!(issuer.verify("not-a-jwt", TokenClass::Access).is_err());
    }

    #[test]
    fn tokens_for_the_same_subject_are_unique() {
        let issuer = issuer();
        let account_id = Uuid::new_v4();
        let first = issuer.issue(account_id, TokenClass::Refresh).unwrap();
        let second = issuer.issue(account_id, TokenClass::Refresh).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let issuer = issuer();
        let other = JwtTokenIssuer::new(
            &Secret::from("some-other-secret".to_string()),
            15,
            7,
            Arc::new(SystemClock),
        );
        let token = other.issue(Uuid::new_v4(), TokenClass::Access).unwrap();
        assert!(issuer.verify(&token, TokenClass::Access).is_err());
    }
}
