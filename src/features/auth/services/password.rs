//! Password hashing for stored credentials.
//!
//! Argon2id with per-password random salts, serialized as PHC strings. Argon2
//! hashes the full input, so there is no silent length ceiling: two long
//! passwords sharing a prefix never verify as equal.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::core::error::{AppError, Result};

/// Hash a password into a PHC-format Argon2id string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash.
///
/// Returns false on any failure, including a malformed stored hash. Never
/// errors, so a corrupt credential row behaves like a wrong password.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn malformed_hash_returns_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$argon2id$truncated"));
    }

    #[test]
    fn long_passwords_are_not_truncated() {
        // Two 100-byte passwords sharing a 72-byte prefix must not collide.
        let prefix = "x".repeat(72);
        let a = format!("{}{}", prefix, "a".repeat(28));
        let b = format!("{}{}", prefix, "b".repeat(28));

        let hash = hash_password(&a).unwrap();
        assert!(verify_password(&a, &hash));
        assert!(!verify_password(&b, &hash));
    }
}
