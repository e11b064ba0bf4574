use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::error::ApiError;

const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Every password rule `password` breaks, in a stable order.
pub fn password_issues(password: &str) -> Vec<&'static str> {
    let mut issues = Vec::new();
    let len = password.chars().count();
    if len < 8 {
        issues.push("Password must be at least 8 characters");
    }
    if len > 100 {
        issues.push("Password too long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push("Password must contain uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push("Password must contain lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push("Password must contain number");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        issues.push("Password must contain special character");
    }
    issues
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collects field-level rule violations for one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(is_valid_email(value), field, "Invalid email format")
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(!value.is_empty(), field, message)
    }

    pub fn name(&mut self, field: &str, value: &str) -> &mut Self {
        let len = value.chars().count();
        self.check(len >= 2, field, "Name must be at least 2 characters")
            .check(len <= 100, field, "Name too long")
    }

    pub fn strong_password(&mut self, field: &str, value: &str) -> &mut Self {
        for issue in password_issues(value) {
            self.check(false, field, issue);
        }
        self
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Validation failed", json!(self.errors)))
        }
    }
}

/// Request payloads that normalize themselves and report rule violations.
pub trait Validate {
    fn validate(&mut self, v: &mut Validator);
}

/// JSON body extractor that deserializes, normalizes and validates `T`,
/// rejecting with a `VALIDATION_ERROR` envelope.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::validation(
                "Validation failed",
                json!([{ "field": "body", "message": rejection.body_text() }]),
            )
        })?;
        let mut v = Validator::default();
        value.validate(&mut v);
        v.finish()?;
        Ok(ValidJson(value))
    }
}
