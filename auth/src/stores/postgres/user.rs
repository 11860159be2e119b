//! PostgreSQL credential store.
//!
//! # Example
//!
//! ```no_run
//! use eventhub_auth::stores::postgres::PostgresCredentialStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/eventhub").await?;
//! let store = PostgresCredentialStore::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::CredentialStore;
use crate::state::{NewUser, Role, User, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;

/// PostgreSQL credential store over the `users` table.
#[derive(Clone)]
pub struct PostgresCredentialStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: String| AuthError::DatabaseError(format!("Corrupt user row: {e}")))?;

        Ok(Self {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

impl PostgresCredentialStore {
    /// Create a new PostgreSQL credential store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, binds: &[&str]) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} LIMIT 1");
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to get user: {e}")))?
            .map(User::try_from)
            .transpose()
    }
}

impl CredentialStore for PostgresCredentialStore {
    fn find_by_email_or_username<'a>(
        &'a self,
        email: &'a str,
        username: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + 'a>> {
        Box::pin(async move {
            self.fetch_one_where("email = $1 OR username = $2", &[email, username])
                .await
        })
    }

    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + 'a>> {
        Box::pin(async move { self.fetch_one_where("email = $1", &[email]).await })
    }

    fn find_by_id(
        &self,
        user_id: UserId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
            sqlx::query_as::<_, UserRow>(&sql)
                .bind(user_id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AuthError::DatabaseError(format!("Failed to get user: {e}")))?
                .map(User::try_from)
                .transpose()
        })
    }

    fn create(&self, user: NewUser) -> Pin<Box<dyn Future<Output = Result<User>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO users (id, username, email, password_hash, role) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {USER_COLUMNS}"
            );

            let row = sqlx::query_as::<_, UserRow>(&sql)
                .bind(UserId::new().0)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            return AuthError::DuplicateAccount;
                        }
                    }
                    AuthError::DatabaseError(format!("Failed to create user: {e}"))
                })?;

            User::try_from(row)
        })
    }
}
