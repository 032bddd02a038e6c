use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::auth::password;
pub use crate::auth::repo_types::User;

/// Credential-store failures. The duplicate variants come from the unique
/// indexes on users, so concurrent registrations race safely: exactly one
/// insert wins and the loser sees the constraint name.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Persist a new user. `password_hash` must already be hashed; the
    /// plaintext never reaches this layer.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.constraint() == Some("users_username_key") => {
                Err(AuthError::DuplicateUsername)
            }
            Err(sqlx::Error::Database(e)) if e.constraint() == Some("users_email_key") => {
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    /// Check username + password. Unknown username and wrong password are
    /// deliberately indistinguishable to the caller. Timing still differs
    /// between the two paths; see the open hardening note in DESIGN.md.
    pub async fn authenticate(
        db: &PgPool,
        username: &str,
        plaintext: &str,
    ) -> Result<User, AuthError> {
        let user = Self::find_by_username(db, username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = password::verify_password(plaintext, &user.password_hash).unwrap_or_else(|e| {
            warn!(error = %e, user_id = %user.id, "stored password hash failed to parse");
            false
        });
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }
}
