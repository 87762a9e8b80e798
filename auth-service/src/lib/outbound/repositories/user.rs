use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::CredentialStore;

/// PostgreSQL credential store.
///
/// Owns the password hasher so stored hashes never cross the port.
pub struct PostgresCredentialStore {
    pool: PgPool,
    hasher: PasswordHasher,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email)
            .map_err(|e| StoreError::InvalidRecord(format!("user {}: {}", row.id, e)))?;

        Ok(User {
            id: UserId(row.id),
            email,
            is_active: row.is_active,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        })
    }
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    async fn touch_last_login(&self, id: &UserId) {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await;

        if let Err(e) = result {
            tracing::warn!(user_id = %id, error = %e, "Failed to record last login");
        }
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, is_active, created_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, is_active, created_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(User::try_from).transpose()
    }

    async fn verify_password(&self, id: &UserId, password: &Password) -> Result<bool, StoreError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;

        let Some(stored) = stored else {
            return Ok(false);
        };

        // Argon2 is CPU bound; keep it off the async workers.
        let hasher = self.hasher.clone();
        let candidate = password.clone();
        let matched = tokio::task::spawn_blocking(move || hasher.verify(candidate.as_str(), &stored))
            .await
            .map_err(|e| StoreError::Hashing(e.to_string()))?
            .map_err(|e| StoreError::Hashing(e.to_string()))?;

        if matched {
            self.touch_last_login(id).await;
        }

        Ok(matched)
    }

    async fn create_user(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::Conflict(email.as_str().to_string());
                }
            }
            unavailable(e)
        })?;

        Ok(UserId(id))
    }
}
