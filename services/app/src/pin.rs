//! services/app/src/pin.rs
//!
//! Parental PIN hashing and input validation.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use kids_learning_core::ports::{PortError, PortResult};
use regex::Regex;
use tracing::error;

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> PortResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .ok_or_else(|| PortError::Unexpected(format!("Invalid pattern {}", pattern)))
}

fn pin_pattern() -> PortResult<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&PATTERN, r"^[0-9]{4,6}$")
}

fn email_pattern() -> PortResult<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&PATTERN, r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
}

pub fn validate_email(email: &str) -> PortResult<&str> {
    let email = email.trim();
    if email_pattern()?.is_match(email) {
        Ok(email)
    } else {
        Err(PortError::InvalidInput(format!("'{}' is not an email address", email)))
    }
}

/// Hashes a 4 to 6 digit PIN into a PHC string.
pub fn hash_pin(pin: &str) -> PortResult<String> {
    if !pin_pattern()?.is_match(pin) {
        return Err(PortError::InvalidInput("PIN must be 4 to 6 digits".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash PIN: {:?}", e);
            PortError::Unexpected("Failed to hash PIN".to_string())
        })
}

pub fn verify_pin(pin: &str, pin_hash: &str) -> PortResult<bool> {
    let parsed = PasswordHash::new(pin_hash).map_err(|e| {
        error!("Failed to parse stored PIN hash: {:?}", e);
        PortError::Unexpected("Stored PIN hash is corrupt".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_round_trip() {
        let hash = hash_pin("4821").unwrap();
        assert!(verify_pin("4821", &hash).unwrap());
        assert!(!verify_pin("1111", &hash).unwrap());
    }

    #[test]
    fn pin_must_be_digits() {
        assert!(hash_pin("12").is_err());
        assert!(hash_pin("abcd").is_err());
        assert!(hash_pin("1234567").is_err());
        // Arabic-Indic and fullwidth digits are not accepted.
        assert!(hash_pin("\u{0661}\u{0662}\u{0663}\u{0664}").is_err());
        assert!(hash_pin("\u{FF11}\u{FF12}\u{FF13}\u{FF14}").is_err());
    }

    #[test]
    fn emails() {
        assert_eq!(validate_email(" pat@example.com ").unwrap(), "pat@example.com");
        assert!(validate_email("pat").is_err());
        assert!(validate_email("pat@example").is_err());
    }
}
