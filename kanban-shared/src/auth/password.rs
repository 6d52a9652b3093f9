/// Password hashing module using Argon2id
///
/// Hashes are stored in PHC string format, which is self-describing: the
/// algorithm, version, cost parameters and salt are all embedded in the
/// string, so verification needs nothing but the stored hash.
///
/// # Security
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 19 MiB (19456 KiB)
/// - **Iterations**: 2 passes
/// - **Parallelism**: 1 lane
/// - **Salt**: 16 random bytes from the OS RNG
///
/// Passwords shorter than [`MIN_PASSWORD_LENGTH`] characters are rejected at
/// hash time.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("password1")?;
/// assert!(verify_password("password1", &hash)?);
/// assert!(!verify_password("password2", &hash)?);
/// # Ok(())
/// # }
/// ```

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Password is shorter than the accepted minimum
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize },

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(19456)
        .t_cost(2)
        .p_cost(1)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Checks the minimum length rule without hashing
pub fn check_length(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Hashes a password with Argon2id
///
/// Returns the PHC string, e.g.
/// `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
///
/// # Errors
///
/// - `PasswordError::TooShort` if the password has fewer than 8 characters
/// - `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    check_length(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Cost parameters and salt are read from the hash itself. The comparison
/// is constant-time.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
/// malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Throwaway hash with the production cost parameters, built on first use
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("kanban-dummy-password").ok())
        .as_deref()
}

/// Spends one full verification on a throwaway hash; never authenticates
///
/// Called on the unknown-account login path so it costs the same as a wrong
/// password.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
}

/// Whether `value` already looks like an Argon2 PHC hash
///
/// Used by the user pre-create hook to detect a plaintext password that
/// slipped through.
pub fn is_hashed(value: &str) -> bool {
    value.starts_with("$argon2") && PasswordHash::new(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_hash_password_rejects_short() {
        let err = hash_password("short").unwrap_err();
        assert!(matches!(err, PasswordError::TooShort { min: 8 }));
        assert!(err.to_string().contains("8 characters"));

        // exactly eight characters is accepted
        assert!(hash_password("12345678").is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 4 characters, 12 bytes
        assert!(check_length("密码密码").is_err());
        assert!(check_length("密码密码密码密码").is_ok());
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
        assert!(!verify_password("correct_passwor", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_dummy_hash_uses_production_cost() {
        let hash = dummy_hash().expect("dummy hash should build");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=19456,t=2,p=1"));

        // same instance on every call
        assert!(std::ptr::eq(hash, dummy_hash().unwrap()));
        verify_dummy("kanban-dummy-password");
    }

    #[test]
    fn test_is_hashed() {
        let hash = hash_password("password1").unwrap();
        assert!(is_hashed(&hash));
        assert!(!is_hashed("password1"));
        assert!(!is_hashed("$argon2id$garbage"));
    }
}
