//! Argon2id credential hasher.
//!
//! Produces PHC-format strings (`$argon2id$...`), so parameters travel with
//! the hash and can be tightened later without invalidating stored
//! credentials.

use argon2::password_hash::{PasswordHash as PhcString, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Argon2id adapter for the credential hasher port.
///
/// Uses the `argon2` crate's default parameters (Argon2id v19).
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    /// Create a hasher with default parameters.
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, secret: &str) -> Result<PasswordHash, CredentialHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?
            .to_string();
        PasswordHash::new(phc).map_err(|err| CredentialHashError::hashing(err.to_string()))
    }

    fn verify(&self, secret: &str, hash: &PasswordHash) -> bool {
        let Ok(parsed) = PhcString::new(hash.as_ref()) else {
            return false;
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = Argon2CredentialHasher::new();
        let hash = hasher.hash("analytical1").expect("hashing succeeds");

        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify("analytical1", &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = Argon2CredentialHasher::new();
        let first = hasher.hash("analytical1").expect("hashing succeeds");
        let second = hasher.hash("analytical1").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hashes_never_verify() {
        let hasher = Argon2CredentialHasher::new();
        let corrupt = PasswordHash::new("not-a-phc-string").expect("valid wrapper");
        assert!(!hasher.verify("analytical1", &corrupt));
    }
}
