use serde::{Deserialize, Serialize};

use crate::users::repo_types::PublicUser;
use crate::validation::{Validate, Validator};

pub(crate) fn normalize_email(email: &mut String) {
    *email = email.trim().to_lowercase();
}

/// Request body for account registration.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for SignUpRequest {
    fn validate(&mut self, v: &mut Validator) {
        normalize_email(&mut self.email);
        self.name = self.name.trim().to_string();
        v.email("email", &self.email)
            .strong_password("password", &self.password)
            .name("name", &self.name);
    }
}

/// Request body for credential sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl Validate for SignInRequest {
    fn validate(&mut self, v: &mut Validator) {
        normalize_email(&mut self.email);
        v.email("email", &self.email)
            .required("password", &self.password, "Password required");
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&mut self, v: &mut Validator) {
        normalize_email(&mut self.email);
        v.email("email", &self.email);
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&mut self, v: &mut Validator) {
        v.required("token", &self.token, "Token required")
            .strong_password("password", &self.password);
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: PublicUser,
    pub message: &'static str,
}
