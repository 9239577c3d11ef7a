//! Admin passwords, stored as Argon2id PHC strings (salt and parameters
//! are embedded in the string).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_LENGTH: usize = 12;

pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
}

/// `Ok(false)` on a mismatch. `Err` only when `stored` is not a PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, HashError> {
    let stored = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(other) => Err(other),
    }
}

/// Length in characters, not bytes. Blank passwords are refused outright.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.trim().is_empty() {
        return Err("Password must not be blank".into());
    }
    let length = password.chars().count();
    if length < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long (got {length})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_accepts_only_its_password() {
        let stored = hash_password("hose-reel-ladder-42").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("hose-reel-ladder-42", &stored).unwrap());
        assert!(!verify_password("hose-reel-ladder-43", &stored).unwrap());
    }

    #[test]
    fn unreadable_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn strength_counts_characters() {
        assert!(validate_password_strength("short", MIN_PASSWORD_LENGTH)
            .unwrap_err()
            .contains("at least 12"));
        assert!(validate_password_strength("            ", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_strength("ÄÖÜäöüßéèêëï", MIN_PASSWORD_LENGTH).is_ok());
        assert!(validate_password_strength("brigade-2025", MIN_PASSWORD_LENGTH).is_ok());
    }
}
