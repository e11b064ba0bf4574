use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{SignInRequest, SignUpRequest},
        password::{hash_password, password_matches},
        repo::AuthRepository,
        repo_types::TokenPurpose,
        tokens,
    },
    error::ApiError,
    mail::Mailer,
    users::{
        repo::conflict_on_duplicate,
        repo_types::{PublicUser, User},
    },
};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const EMAIL_TAKEN: &str = "Email already registered";
pub const USER_NOT_FOUND: &str = "User not found";

/// Outcome of a password-reset request. Callers must not let the variant
/// leak into responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetRequest {
    /// No account for the email: nothing stored, nothing sent.
    Ignored,
    Issued(String),
}

struct TokenMessages {
    invalid: &'static str,
    expired: &'static str,
}

const VERIFICATION_MESSAGES: TokenMessages = TokenMessages {
    invalid: "Invalid verification token",
    expired: "Verification token expired",
};

const RESET_MESSAGES: TokenMessages = TokenMessages {
    invalid: "Invalid reset token",
    expired: "Reset token expired",
};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, mailer: Arc<dyn Mailer>) -> Self {
        Self { repo, mailer }
    }

    pub async fn sign_up(&self, data: &SignUpRequest) -> Result<PublicUser, ApiError> {
        if self.repo.find_user_by_email(&data.email).await?.is_some() {
            warn!(email = %data.email, "email already registered");
            return Err(ApiError::conflict(EMAIL_TAKEN));
        }

        let hash = hash_password(&data.password)?;
        let user = self
            .repo
            .create_user(&data.email, &data.name, &hash)
            .await
            .map_err(|e| conflict_on_duplicate(e, EMAIL_TAKEN))?;

        let token = tokens::issue(
            &user.email,
            TokenPurpose::EmailVerification,
            OffsetDateTime::now_utc(),
        );
        self.repo.create_token(&token).await?;
        // The user row stays even if this fails.
        self.mailer
            .send_verification_email(&user.email, &token.token)
            .await?;

        info!(user_id = %user.id, email = %user.email, "user signed up");
        Ok(user.into())
    }

    pub async fn sign_in(&self, data: &SignInRequest) -> Result<PublicUser, ApiError> {
        let user = match self.repo.find_user_by_email(&data.email).await? {
            Some(u) => u,
            None => {
                warn!(email = %data.email, "sign-in unknown email");
                return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
            }
        };
        if !password_matches(&data.password, user.password.as_deref()) {
            warn!(
                user_id = %user.id,
                has_password = user.password.is_some(),
                "sign-in rejected"
            );
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "user signed in");
        Ok(user.into())
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), ApiError> {
        let user = self
            .redeem(token, TokenPurpose::EmailVerification, &VERIFICATION_MESSAGES)
            .await?;
        self.repo.mark_email_verified(user.id).await?;
        info!(user_id = %user.id, "email verified");
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<ResetRequest, ApiError> {
        if self.repo.find_user_by_email(email).await?.is_none() {
            info!("password reset requested for unknown email");
            return Ok(ResetRequest::Ignored);
        }

        let token = tokens::issue(email, TokenPurpose::PasswordReset, OffsetDateTime::now_utc());
        self.repo.create_token(&token).await?;
        // Logged only; the caller answers the same either way.
        if let Err(e) = self
            .mailer
            .send_password_reset_email(email, &token.token)
            .await
        {
            error!(error = ?e, "password reset email failed");
        }

        info!("password reset token issued");
        Ok(ResetRequest::Issued(token.token))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let user = self
            .redeem(token, TokenPurpose::PasswordReset, &RESET_MESSAGES)
            .await?;
        let hash = hash_password(new_password)?;
        self.repo.update_password(user.id, &hash).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Looks up, expiry-checks and consumes a token, returning its user.
    /// Expired tokens are deleted on sight. Consumption is a conditional
    /// delete, so of two concurrent redeemers only one proceeds.
    async fn redeem(
        &self,
        token: &str,
        purpose: TokenPurpose,
        messages: &TokenMessages,
    ) -> Result<User, ApiError> {
        let record = self
            .repo
            .find_token(token, purpose)
            .await?
            .ok_or_else(|| ApiError::not_found(messages.invalid))?;

        if record.is_expired_at(OffsetDateTime::now_utc()) {
            self.repo.consume_token(token, purpose).await?;
            warn!(?purpose, "expired token presented");
            return Err(ApiError::unauthorized(messages.expired));
        }

        let user = self
            .repo
            .find_user_by_email(&record.identifier)
            .await?
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

        if !self.repo.consume_token(token, purpose).await? {
            warn!(?purpose, "token already consumed");
            return Err(ApiError::not_found(messages.invalid));
        }
        Ok(user)
    }
}
