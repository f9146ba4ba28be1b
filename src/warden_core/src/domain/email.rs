use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email address")]
    Invalid,
}

/// A validated email address.
///
/// The inner value is wrapped in [`Secret`] so it never shows up in debug
/// output or logs; use [`Email::as_ref`] and `expose_secret` at the points
/// where the raw address is genuinely needed (persistence, delivery).
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl Email {
    pub fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl TryFrom<Secret<String>> for Email {
    type Error = EmailError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if EMAIL_PATTERN.is_match(value.expose_secret()) {
            Ok(Self(value))
        } else {
            Err(EmailError::Invalid)
        }
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.expose_secret().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_address() {
        let email = Email::try_from(Secret::from("user@example.com".to_string()));
        assert!(email.is_ok());
    }

    #[test]
    fn rejects_address_without_at_sign() {
        let email = Email::try_from(Secret::from("user.example.com".to_string()));
        assert!(matches!(email, Err(EmailError::Invalid)));
    }

    #[test]
    fn rejects_address_with_whitespace() {
        let email = Email::try_from(Secret::from("user @example.com".to_string()));
        assert!(matches!(email, Err(EmailError::Invalid)));
    }

    #[test]
    fn rejects_empty_string() {
        let email = Email::try_from(Secret::from(String::new()));
        assert!(matches!(email, Err(EmailError::Invalid)));
    }

    #[test]
    fn equality_compares_inner_address() {
        let a = Email::try_from(Secret::from("a@example.com".to_string())).unwrap();
        let b = Email::try_from(Secret::from("a@example.com".to_string())).unwrap();
        assert_eq!(a, b);
    }
}
