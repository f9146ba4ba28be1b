use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use warden_core::{
    Account, AuditEvent, CredentialStore, CredentialTx, Email, NewAccount, NewOtpRecord,
    NewSession, OtpPurpose, OtpRecord, RequestOrigin, Session, StoreError,
};

/// Postgres-backed credential store. Each [`CredentialTx`] wraps one
/// `sqlx` transaction; conflicting row writes serialize through row-level
/// locks (`FOR UPDATE` on the active OTP fetch, atomic counter updates).
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    type Tx = PostgresCredentialTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await.map_err(unexpected)?;
        Ok(PostgresCredentialTx { tx })
    }
}

pub struct PostgresCredentialTx {
    tx: Transaction<'static, Postgres>,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::try_from(Secret::from(row.email))
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;
        Ok(Account {
            id: row.id,
            email,
            password_hash: Secret::from(row.password_hash),
            name: row.name,
            verified: row.verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: Uuid,
    account_id: Uuid,
    code_hash: String,
    purpose: String,
    expires_at: DateTime<Utc>,
    attempts: i32,
    max_attempts: i32,
    consumed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OtpRow> for OtpRecord {
    type Error = StoreError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        let purpose = OtpPurpose::from_str(&row.purpose)
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;
        Ok(OtpRecord {
            id: row.id,
            account_id: row.account_id,
            code_hash: Secret::from(row.code_hash),
            purpose,
            expires_at: row.expires_at,
            attempts: row.attempts,
            max_attempts: row.max_attempts,
            consumed_at: row.consumed_at,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    account_id: Uuid,
    refresh_token_hash: String,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            account_id: row.account_id,
            refresh_token_hash: Secret::from(row.refresh_token_hash),
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CredentialTx for PostgresCredentialTx {
    #[tracing::instrument(name = "Looking up account in PostgreSQL", skip_all)]
    async fn find_account_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
                SELECT id, email, password_hash, name, verified, created_at, updated_at
                FROM accounts
                WHERE email = $1
            "#,
        )
        .bind(email.as_ref().expose_secret())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;

        row.map(Account::try_from).transpose()
    }

    #[tracing::instrument(name = "Inserting account into PostgreSQL", skip_all)]
    async fn insert_account(
        &mut self,
        account: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO accounts (id, email, password_hash, name, verified, created_at, updated_at)
                VALUES ($1, $2, $3, $4, FALSE, $5, $5)
            "#,
        )
        .bind(id)
        .bind(account.email.as_ref().expose_secret())
        .bind(account.password_hash.expose_secret())
        .bind(&account.name)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::EmailTaken;
                }
            }
            unexpected(e)
        })?;

        Ok(Account {
            id,
            email: account.email,
            password_hash: account.password_hash,
            name: account.name,
            verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    #[tracing::instrument(name = "Marking account verified in PostgreSQL", skip_all)]
    async fn mark_account_verified(
        &mut self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET verified = TRUE, updated_at = $2 WHERE id = $1")
            .bind(account_id)
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Rewriting password hash in PostgreSQL", skip_all)]
    async fn update_password_hash(
        &mut self,
        account_id: Uuid,
        password_hash: Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(account_id)
            .bind(password_hash.expose_secret())
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Replacing OTP record in PostgreSQL", skip_all)]
    async fn replace_otp(
        &mut self,
        otp: NewOtpRecord,
        now: DateTime<Utc>,
    ) -> Result<OtpRecord, StoreError> {
        sqlx::query("DELETE FROM otp_codes WHERE account_id = $1 AND purpose = $2")
            .bind(otp.account_id)
            .bind(otp.purpose.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO otp_codes
                    (id, account_id, code_hash, purpose, expires_at, attempts, max_attempts, consumed_at, created_at)
                VALUES ($1, $2, $3, $4, $5, 0, $6, NULL, $7)
            "#,
        )
        .bind(id)
        .bind(otp.account_id)
        .bind(otp.code_hash.expose_secret())
        .bind(otp.purpose.as_str())
        .bind(otp.expires_at)
        .bind(otp.max_attempts)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;

        Ok(OtpRecord {
            id,
            account_id: otp.account_id,
            code_hash: otp.code_hash,
            purpose: otp.purpose,
            expires_at: otp.expires_at,
            attempts: 0,
            max_attempts: otp.max_attempts,
            consumed_at: None,
            created_at: now,
        })
    }

    #[tracing::instrument(name = "Fetching active OTP from PostgreSQL", skip_all)]
    async fn active_otp(
        &mut self,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, StoreError> {
        // FOR UPDATE serializes concurrent verifications of the same record.
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
                SELECT id, account_id, code_hash, purpose, expires_at, attempts, max_attempts, consumed_at, created_at
                FROM otp_codes
                WHERE account_id = $1 AND purpose = $2 AND consumed_at IS NULL
                ORDER BY created_at DESC
                LIMIT 1
                FOR UPDATE
            "#,
        )
        .bind(account_id)
        .bind(purpose.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(unexpected)?;

        row.map(OtpRecord::try_from).transpose()
    }

    #[tracing::instrument(name = "Incrementing OTP attempts in PostgreSQL", skip_all)]
    async fn increment_otp_attempts(&mut self, otp_id: Uuid) -> Result<i32, StoreError> {
        let row =
            sqlx::query("UPDATE otp_codes SET attempts = attempts + 1 WHERE id = $1 RETURNING attempts")
                .bind(otp_id)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(unexpected)?;
        row.try_get("attempts").map_err(unexpected)
    }

    #[tracing::instrument(name = "Consuming OTP in PostgreSQL", skip_all)]
    async fn consume_otp(&mut self, otp_id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE otp_codes SET consumed_at = $2 WHERE id = $1")
            .bind(otp_id)
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Inserting session into PostgreSQL", skip_all)]
    async fn insert_session(
        &mut self,
        session: NewSession,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO sessions (id, account_id, refresh_token_hash, expires_at, revoked_at, created_at)
                VALUES ($1, $2, $3, $4, NULL, $5)
            "#,
        )
        .bind(id)
        .bind(session.account_id)
        .bind(session.refresh_token_hash.expose_secret())
        .bind(session.expires_at)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;

        Ok(Session {
            id,
            account_id: session.account_id,
            refresh_token_hash: session.refresh_token_hash,
            expires_at: session.expires_at,
            revoked_at: None,
            created_at: now,
        })
    }

    #[tracing::instrument(name = "Listing active sessions from PostgreSQL", skip_all)]
    async fn active_sessions(
        &mut self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, StoreError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
                SELECT id, account_id, refresh_token_hash, expires_at, revoked_at, created_at
                FROM sessions
                WHERE account_id = $1 AND revoked_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(account_id)
        .bind(now)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(unexpected)?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    #[tracing::instrument(name = "Revoking session in PostgreSQL", skip_all)]
    async fn revoke_session(
        &mut self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET revoked_at = $2 WHERE id = $1")
            .bind(session_id)
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Appending audit event in PostgreSQL", skip_all)]
    async fn append_audit(
        &mut self,
        account_id: Option<Uuid>,
        event: &AuditEvent,
        origin: &RequestOrigin,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
                INSERT INTO audit_logs (id, account_id, event_type, metadata, ip, user_agent, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(event.event_type())
        .bind(event.metadata())
        .bind(origin.ip.as_deref())
        .bind(origin.user_agent.as_deref())
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(unexpected)
    }
}

fn unexpected(e: sqlx::Error) -> StoreError {
    StoreError::Unexpected(e.to_string())
}
