// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential hashing (Argon2id, random per-record salt).

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::{AppError, Result};

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// [`hash_password`] on the blocking pool, for use from request handlers.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    /// A malformed stored hash never verifies.
    fn verify_password(password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("ironman123").unwrap();

        assert_ne!(hash, "ironman123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("ironman123", &hash));
        assert!(!verify_password("ironman124", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("cap123").unwrap();
        let second = hash_password("cap123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "plaintext-password"));
        assert!(!verify_password("", ""));
    }

    #[tokio::test]
    async fn test_blocking_hash_verifies() {
        let hash = hash_password_blocking("wonder1".to_string()).await.unwrap();
        assert!(verify_password("wonder1", &hash));
    }
}
