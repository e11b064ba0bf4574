use serde::Deserialize;

use crate::auth::dto::normalize_email;
use crate::error::ApiError;
use crate::users::repo_types::{NewUser, UserChanges, UserFilters, UserRole};
use crate::validation::{Validate, Validator};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl Validate for CreateUserRequest {
    fn validate(&mut self, v: &mut Validator) {
        normalize_email(&mut self.email);
        v.email("email", &self.email).name("name", &self.name);
    }
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        NewUser {
            email: r.email,
            name: r.name,
            password: None,
            role: r.role.unwrap_or(UserRole::User),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

impl Validate for UpdateUserRequest {
    fn validate(&mut self, v: &mut Validator) {
        if let Some(email) = self.email.as_mut() {
            normalize_email(email);
            v.email("email", email);
        }
        if let Some(name) = self.name.as_deref() {
            v.name("name", name);
        }
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(r: UpdateUserRequest) -> Self {
        UserChanges {
            email: r.email,
            name: r.name,
            role: r.role,
        }
    }
}

/// Raw list query; every value arrives as text and is coerced in `parse`.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ListUsersParams {
    pub filters: UserFilters,
    pub page: i64,
    pub limit: i64,
}

fn positive(raw: Option<&str>, default: i64) -> Option<i64> {
    match raw {
        None => Some(default),
        Some(s) => s.trim().parse::<i64>().ok().filter(|n| *n > 0),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl ListUsersQuery {
    pub fn parse(self) -> Result<ListUsersParams, ApiError> {
        let mut v = Validator::default();

        let role = non_empty(self.role);
        let parsed_role = role.as_deref().and_then(UserRole::parse);
        v.check(
            role.is_none() || parsed_role.is_some(),
            "role",
            "Role must be one of admin, user, guest",
        );

        let page = positive(non_empty(self.page).as_deref(), DEFAULT_PAGE);
        v.check(page.is_some(), "page", "Page must be a positive integer");

        let limit = positive(non_empty(self.limit).as_deref(), DEFAULT_LIMIT);
        v.check(limit.is_some(), "limit", "Limit must be a positive integer")
            .check(
                limit.map_or(true, |l| l <= MAX_LIMIT),
                "limit",
                "Limit must be at most 100",
            );
        if let (Some(page), Some(limit)) = (page, limit) {
            v.check(
                (page - 1).checked_mul(limit).is_some(),
                "page",
                "Page out of range",
            );
        }

        v.finish()?;
        Ok(ListUsersParams {
            filters: UserFilters {
                role: parsed_role,
                search: non_empty(self.search),
            },
            page: page.unwrap_or(DEFAULT_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        })
    }
}
