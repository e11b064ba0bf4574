use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::warn;

/// Hashes a new account password into the Argon2id PHC string stored in
/// `users.password`.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {}", e))
}

/// Checks a sign-in attempt against the stored hash.
///
/// Accounts created without credentials (`None`) never match, and neither
/// does a stored value that is not a valid PHC string, so every failure
/// looks the same to the caller.
pub fn password_matches(plain: &str, stored: Option<&str>) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is not a PHC string");
            false
        }
    }
}
