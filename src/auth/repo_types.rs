use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};

/// Which flow a verification token belongs to. Lookups are always scoped
/// by purpose, so a reset token never verifies an email and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn ttl(self) -> Duration {
        match self {
            TokenPurpose::EmailVerification => Duration::hours(24),
            TokenPurpose::PasswordReset => Duration::hours(1),
        }
    }
}

/// Single-use credential row.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationToken {
    pub identifier: String, // email the token was issued for
    pub token: String,
    pub purpose: TokenPurpose,
    pub expires: OffsetDateTime,
}

impl VerificationToken {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires < now
    }
}
