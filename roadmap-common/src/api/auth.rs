//! Credential and session token helpers
//!
//! # Architecture
//!
//! - Passwords are stored as Argon2id PHC strings; the random 16-byte salt
//!   and the cost parameters travel inside the stored string
//! - Sessions are opaque UUIDv4 bearer tokens persisted in the `sessions`
//!   table; expiry comes from the `session_timeout_seconds` setting
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions.
//! No HTTP framework dependencies (Axum, etc.) - those are in the server crate.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Accepted username length range (inclusive)
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=20;

static EMAIL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

// ========================================
// Password Hashing
// ========================================

/// Hash a password with a fresh random salt, returning a PHC string
///
/// # Examples
///
/// ```
/// use roadmap_common::api::auth::{hash_password, verify_password};
///
/// let hash = hash_password("secret").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("secret", &hash));
/// ```
pub fn hash_password(password: &str) -> crate::Result<String> {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&bytes)
        .map_err(|e| Error::Internal(format!("Failed to encode password salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a candidate password against a stored PHC string
///
/// A stored value that does not parse never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ========================================
// Input Validation
// ========================================

/// Structural e-mail check: `local@domain.tld`
///
/// # Examples
///
/// ```
/// use roadmap_common::api::auth::is_valid_email;
///
/// assert!(is_valid_email("ada@example.com"));
/// assert!(!is_valid_email("ada@example"));
/// assert!(!is_valid_email("ada.example.com"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Validate registration fields, returning a user-facing message on failure
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), String> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Username, email and password are required".to_string());
    }
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(format!(
            "Username must be between {} and {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        ));
    }
    if username.contains('@') {
        return Err("Username must not contain '@'".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if !is_valid_email(email) {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

// ========================================
// Bearer Tokens
// ========================================

/// Generate a new opaque session token
pub fn generate_token() -> String {
    crate::uuid_utils::generate().simple().to_string()
}

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// # Examples
///
/// ```
/// use roadmap_common::api::auth::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
/// assert_eq!(parse_bearer("Basic abc123"), None);
/// assert_eq!(parse_bearer("Bearer "), None);
/// ```
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
