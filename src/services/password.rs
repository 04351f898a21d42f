//! Password hashing
//!
//! Argon2id with the crate's default parameters and a random salt per hash.
//! Hashes are stored as PHC strings, which embed algorithm, parameters and salt.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password.
///
/// ```ignore
/// use chigo::services::password::hash_password;
///
/// let hash = hash_password("hunter22")?;
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Check a plaintext password against a stored PHC hash.
///
/// A wrong password is `Ok(false)`; a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id() {
        let hash = hash_password("chicago-2024").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("chicago-2024"));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("same").expect("Failed to hash password");
        let b = hash_password("same").expect("Failed to hash password");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("right").expect("Failed to hash password");

        assert!(verify_password("right", &hash).expect("Verification should not error"));
        assert!(!verify_password("wrong", &hash).expect("Verification should not error"));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let password = "Wrigley⚾Field";
        let hash = hash_password(password).expect("Failed to hash password");
        assert!(verify_password(password, &hash).expect("Verification should not error"));
    }
}
