use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo_types::{NewUser, User, UserChanges, UserFilters};

/// Insert or update collided with the unique email index.
#[derive(Debug, thiserror::Error)]
#[error("email already exists")]
pub struct DuplicateEmail;

/// Turns a unique-violation into [`DuplicateEmail`], anything else into a
/// contextual internal error.
pub(crate) fn map_write_error(err: sqlx::Error, context: &'static str) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DuplicateEmail.into();
        }
    }
    anyhow::Error::new(err).context(context)
}

/// Maps a repository write failure to `CONFLICT` when the email was taken
/// concurrently, otherwise to an internal error.
pub(crate) fn conflict_on_duplicate(err: anyhow::Error, message: &'static str) -> ApiError {
    if err.is::<DuplicateEmail>() {
        ApiError::conflict(message)
    } else {
        err.into()
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Newest first, `limit` rows starting at `offset`.
    async fn find_all(&self, filters: &UserFilters, limit: i64, offset: i64)
        -> anyhow::Result<Vec<User>>;
    async fn count(&self, filters: &UserFilters) -> anyhow::Result<i64>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>>;
    /// Returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// ILIKE pattern matching `term` as a literal substring.
pub(crate) fn search_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(
        &self,
        filters: &UserFilters,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password, role, email_verified, image, created_at, updated_at
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::text IS NULL OR email ILIKE $2 OR name ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filters.role)
        .bind(filters.search.as_deref().map(search_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn count(&self, filters: &UserFilters) -> anyhow::Result<i64> {
        let (total,) = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::text IS NULL OR email ILIKE $2 OR name ILIKE $2)
            "#,
        )
        .bind(filters.role)
        .bind(filters.search.as_deref().map(search_pattern))
        .fetch_one(&self.db)
        .await
        .context("count users")?;
        Ok(total)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password, role, email_verified, image, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
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

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password, role, email_verified, image, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.password)
        .bind(new.role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, "insert user"))?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET email = COALESCE($2, email),
                   name = COALESCE($3, name),
                   role = COALESCE($4, role),
                   updated_at = now()
             WHERE id = $1
            RETURNING id, email, name, password, role, email_verified, image, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.email)
        .bind(changes.name)
        .bind(changes.role)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_error(e, "update user"))?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}
