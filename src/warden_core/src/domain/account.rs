use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use super::email::Email;

/// A registered account row.
///
/// `verified` flips to true exactly once, on successful verification of a
/// `register` OTP. The password hash is only ever rewritten by a completed
/// password reset.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: Secret<String>,
    pub name: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an account. The store assigns the id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub password_hash: Secret<String>,
    pub name: String,
}
