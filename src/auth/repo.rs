use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{TokenPurpose, VerificationToken};
use crate::users::repo::map_write_error;
use crate::users::repo_types::{User, UserRole};

/// Persistence needed by the auth flows.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Inserts a credential account with role `user`. A taken email fails
    /// with [`DuplicateEmail`](crate::users::repo::DuplicateEmail).
    async fn create_user(&self, email: &str, name: &str, password_hash: &str)
        -> anyhow::Result<User>;
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    async fn mark_email_verified(&self, user_id: Uuid) -> anyhow::Result<()>;

    async fn create_token(&self, token: &VerificationToken) -> anyhow::Result<()>;
    async fn find_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> anyhow::Result<Option<VerificationToken>>;
    /// Deletes the token if it is still present. Returns whether this call
    /// removed it; concurrent callers see exactly one `true`.
    async fn consume_token(&self, token: &str, purpose: TokenPurpose) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgAuthRepository {
    db: PgPool,
}

impl PgAuthRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password, role, email_verified, image, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password, role, email_verified, image, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(UserRole::User)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, "insert credential user"))?;
        Ok(user)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("update password")?;
        Ok(())
    }

    async fn mark_email_verified(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET email_verified = now(), updated_at = now() WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("mark email verified")?;
        Ok(())
    }

    async fn create_token(&self, token: &VerificationToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (token, identifier, purpose, expires)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.token)
        .bind(&token.identifier)
        .bind(token.purpose)
        .bind(token.expires)
        .execute(&self.db)
        .await
        .context("insert verification token")?;
        Ok(())
    }

    async fn find_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> anyhow::Result<Option<VerificationToken>> {
        let row = sqlx::query_as::<_, VerificationToken>(
            r#"
            SELECT identifier, token, purpose, expires
            FROM verification_tokens
            WHERE token = $1 AND purpose = $2
            "#,
        )
        .bind(token)
        .bind(purpose)
        .fetch_optional(&self.db)
        .await
        .context("find verification token")?;
        Ok(row)
    }

    async fn consume_token(&self, token: &str, purpose: TokenPurpose) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM verification_tokens WHERE token = $1 AND purpose = $2")
            .bind(token)
            .bind(purpose)
            .execute(&self.db)
            .await
            .context("consume verification token")?;
        Ok(res.rows_affected() == 1)
    }
}
