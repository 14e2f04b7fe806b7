//! Port abstraction for credential hashing and verification.
//!
//! The domain only ever sees opaque [`PasswordHash`] values; producing and
//! checking them is delegated to an adapter (Argon2id in production).

use crate::domain::PasswordHash;

/// Errors raised while hashing a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialHashError {
    /// The hashing primitive failed.
    #[error("credential hashing failed: {message}")]
    Hashing { message: String },
}

impl CredentialHashError {
    /// Create a hashing error with the given message.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}

/// Credential verifier port.
///
/// Hashing is synchronous: the work is CPU-bound and adapters choose their
/// own cost parameters.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext secret into an opaque, self-describing string.
    fn hash(&self, secret: &str) -> Result<PasswordHash, CredentialHashError>;

    /// Verify a plaintext secret against a stored hash.
    ///
    /// Malformed stored hashes verify as `false` rather than erroring; a
    /// corrupt record must not let a caller in.
    fn verify(&self, secret: &str, hash: &PasswordHash) -> bool;
}

/// Transparent hasher for tests and database-less development runs.
///
/// Encodes the secret with a recognisable prefix instead of hashing it. Never
/// wire this into a deployment that stores real credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

const FIXTURE_PREFIX: &str = "plain$";

impl CredentialHasher for FixtureCredentialHasher {
    fn hash(&self, secret: &str) -> Result<PasswordHash, CredentialHashError> {
        PasswordHash::new(format!("{FIXTURE_PREFIX}{secret}"))
            .map_err(|err| CredentialHashError::hashing(err.to_string()))
    }

    fn verify(&self, secret: &str, hash: &PasswordHash) -> bool {
        hash.as_ref()
            .strip_prefix(FIXTURE_PREFIX)
            .is_some_and(|stored| stored == secret)
    }
}
