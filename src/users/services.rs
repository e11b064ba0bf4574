use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiError,
    response::{PageInfo, Paginated},
    users::{
        repo::{conflict_on_duplicate, UserRepository},
        repo_types::{NewUser, User, UserChanges, UserFilters},
    },
};

const USER_EXISTS: &str = "User with this email already exists";
const EMAIL_TAKEN: &str = "Email already taken";

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("User with id {} not found", id))
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        filters: &UserFilters,
        page: i64,
        limit: i64,
    ) -> Result<Paginated<User>, ApiError> {
        let offset = (page - 1).saturating_mul(limit);
        let items = self.repo.find_all(filters, limit, offset).await?;
        let total = self.repo.count(filters).await?;
        Ok(Paginated {
            items,
            pagination: PageInfo::new(page, limit, total),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, new: NewUser) -> Result<User, ApiError> {
        if self.repo.find_by_email(&new.email).await?.is_some() {
            return Err(ApiError::conflict(USER_EXISTS));
        }
        let user = self
            .repo
            .create(new)
            .await
            .map_err(|e| conflict_on_duplicate(e, USER_EXISTS))?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, ApiError> {
        let existing = self.get(id).await?;

        if let Some(email) = changes.email.as_deref() {
            if email != existing.email && self.repo.find_by_email(email).await?.is_some() {
                return Err(ApiError::conflict(EMAIL_TAKEN));
            }
        }

        let updated = self
            .repo
            .update(id, changes)
            .await
            .map_err(|e| conflict_on_duplicate(e, EMAIL_TAKEN))?
            .ok_or_else(|| not_found(id))?;
        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.get(id).await?;
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
