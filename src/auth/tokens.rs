use rand::{rngs::OsRng, RngCore};
use time::OffsetDateTime;

use super::repo_types::{TokenPurpose, VerificationToken};

pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Hex-encoded random bytes from the OS CSPRNG.
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Fresh token for `email`, expiring after the purpose's TTL from `now`.
pub fn issue(email: &str, purpose: TokenPurpose, now: OffsetDateTime) -> VerificationToken {
    VerificationToken {
        identifier: email.to_string(),
        token: generate_token(DEFAULT_TOKEN_BYTES),
        purpose,
        expires: now + purpose.ttl(),
    }
}
