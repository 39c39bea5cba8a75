use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext password with Argon2id, salted per hash. The work
/// factor (memory and iterations) comes from configuration.
pub fn hash(plain: &str, security: &SecurityConfig) -> Result<String, PasswordError> {
    let params = Params::new(security.hash_memory_kib, security.hash_iterations, 1, None)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let salt = SaltString::generate(&mut rand::thread_rng());
    let hashed = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hashed.to_string())
}

/// Check a plaintext password against a stored hash. The hash string
/// carries its own parameters, so verification needs no configuration.
/// Unparsable hashes count as a mismatch.
pub fn verify(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_hours: 24,
            verification_ttl_hours: 24,
            // Minimal work factor to keep the test fast
            hash_memory_kib: 8,
            hash_iterations: 1,
        }
    }

    #[test]
    fn hash_then_verify() {
        let stored = hash("password1", &security()).unwrap();
        assert!(verify("password1", &stored));
        assert!(!verify("password2", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("password1", &security()).unwrap();
        let b = hash("password1", &security()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify("password1", "not-a-phc-hash"));
    }
}
