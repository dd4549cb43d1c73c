//! Password hashing using bcrypt
//!
//! Provides salted password hashing and verification.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Request handlers should use the
//! `_async` variants, which run on the blocking thread pool.

use anyhow::Result;

/// bcrypt work factor used for every stored hash
pub const HASH_COST: u32 = 10;

/// bcrypt ignores everything past this many bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Credential hashing and verification
///
/// Stateless: every operation is a pure function of its inputs (plus the
/// random salt drawn by `hash`).
pub struct CredentialManager;

impl CredentialManager {
    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// Passwords longer than `MAX_PASSWORD_BYTES` are refused, since bcrypt
    /// would otherwise hash only their prefix.
    pub fn hash(password: &str) -> Result<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            anyhow::bail!("Password exceeds {} bytes", MAX_PASSWORD_BYTES);
        }
        bcrypt::hash(password, HASH_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// The comparison itself is bcrypt's constant-time check. A hash that
    /// cannot be parsed is an error rather than a mismatch. An input longer
    /// than `MAX_PASSWORD_BYTES` never matches, because no stored hash can
    /// have come from it.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        bcrypt::verify(password, hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hash = CredentialManager::hash(password).unwrap();

        assert!(CredentialManager::verify(password, &hash).unwrap());
        assert!(!CredentialManager::verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_not_plaintext_and_uses_cost() {
        let hash = CredentialManager::hash("hunter2").unwrap();
        assert!(!hash.contains("hunter2"));
        // Modular crypt format: $2b$10$<salt+digest>
        assert!(hash.starts_with("$2"));
        assert_eq!(&hash[4..6], "10");
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "test_password";
        let hash1 = CredentialManager::hash(password).unwrap();
        let hash2 = CredentialManager::hash(password).unwrap();

        // Hashes should be different due to random salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(CredentialManager::verify(password, &hash1).unwrap());
        assert!(CredentialManager::verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(CredentialManager::verify("anything", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_overlong_password_refused() {
        assert!(CredentialManager::hash(&"x".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
        // 36 two-byte characters plus one is 73 bytes
        assert!(CredentialManager::hash(&format!("{}a", "é".repeat(36))).is_err());
    }

    #[test]
    fn test_shared_72_byte_prefix_does_not_verify() {
        let password = "x".repeat(MAX_PASSWORD_BYTES);
        let hash = CredentialManager::hash(&password).unwrap();

        assert!(CredentialManager::verify(&password, &hash).unwrap());
        let extended = format!("{}totally-different", password);
        assert!(!CredentialManager::verify(&extended, &hash).unwrap());
    }

    #[test]
    fn test_multibyte_prefix_does_not_verify() {
        let password = format!("{}a", "é".repeat(35));
        let hash = CredentialManager::hash(&password).unwrap();

        assert!(!CredentialManager::verify(&format!("{}a", "é".repeat(36)), &hash).unwrap());
        assert!(!CredentialManager::verify(&format!("{}ab", password), &hash).unwrap());
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password".to_string();
        let hash = CredentialManager::hash_async(password.clone()).await.unwrap();

        assert!(CredentialManager::verify_async(password.clone(), hash.clone()).await.unwrap());
        assert!(!CredentialManager::verify_async("wrong".to_string(), hash).await.unwrap());
    }

    // Each case costs two bcrypt rounds, so keep the case count small
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_only_the_hashed_password_verifies(
            password in "[a-zA-Z0-9!@#$%^&*]{1,40}",
            other in "[a-zA-Z0-9!@#$%^&*]{1,40}",
        ) {
            let hash = CredentialManager::hash(&password).unwrap();
            prop_assert!(CredentialManager::verify(&password, &hash).unwrap());
            if other != password {
                prop_assert!(!CredentialManager::verify(&other, &hash).unwrap());
            }
        }
    }
}
