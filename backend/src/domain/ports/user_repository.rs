//! Port abstraction for identity persistence adapters and their errors.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },

    /// The email address is already associated with another account.
    #[error("email address is already in use: {email}")]
    DuplicateEmail { email: String },
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a duplicate-email error for the given address.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Identity store port.
///
/// Adapters are expected to enforce email uniqueness at write time and to
/// surface violations as [`UserRepositoryError::DuplicateEmail`] so the
/// check-then-insert race cannot mint two accounts for one address.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by (normalised) email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Replace the stored record matching the user's id.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Delete the record with the given id, if present.
    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError>;
}

/// In-memory identity store for tests and database-less development runs.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, UserRepositoryError> {
        self.users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }

    /// Number of stored users; exposed for test assertions.
    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    /// True when no users are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.lock()?;
        if users.iter().any(|stored| stored.email() == user.email()) {
            return Err(UserRepositoryError::duplicate_email(user.email().as_ref()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let users = self.lock()?;
        Ok(users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self.lock()?;
        Ok(users.iter().find(|user| user.email() == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.lock()?;
        if users
            .iter()
            .any(|stored| stored.email() == user.email() && stored.id() != user.id())
        {
            return Err(UserRepositoryError::duplicate_email(user.email().as_ref()));
        }
        match users.iter_mut().find(|stored| stored.id() == user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserRepositoryError::query("user not found for update")),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let mut users = self.lock()?;
        users.retain(|user| user.id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::test_fixtures::fixture_user;

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        let first = fixture_user("Ada Lovelace", "ada@example.com");
        let second = fixture_user("Other Ada", "ada@example.com");

        repo.insert(&first).await.expect("first insert succeeds");
        let err = repo
            .insert(&second)
            .await
            .expect_err("second insert must fail");
        assert!(matches!(err, UserRepositoryError::DuplicateEmail { .. }));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_email_taken_by_another_account() {
        let repo = InMemoryUserRepository::new();
        let ada = fixture_user("Ada Lovelace", "ada@example.com");
        let grace = fixture_user("Grace Hopper", "grace@example.com");
        repo.insert(&ada).await.expect("insert ada");
        repo.insert(&grace).await.expect("insert grace");

        let moved = grace.with_email(ada.email().clone());
        let err = repo.update(&moved).await.expect_err("collision must fail");
        assert!(matches!(err, UserRepositoryError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn lookups_match_by_id_and_email() {
        let repo = InMemoryUserRepository::new();
        let ada = fixture_user("Ada Lovelace", "ada@example.com");
        repo.insert(&ada).await.expect("insert ada");

        let by_id = repo.find_by_id(ada.id()).await.expect("find by id");
        assert_eq!(by_id.as_ref(), Some(&ada));

        let by_email = repo
            .find_by_email(ada.email())
            .await
            .expect("find by email");
        assert_eq!(by_email, Some(ada));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let repo = InMemoryUserRepository::new();
        let ada = fixture_user("Ada Lovelace", "ada@example.com");
        repo.insert(&ada).await.expect("insert ada");
        repo.delete(ada.id()).await.expect("delete ada");
        assert!(repo.is_empty());
    }
}
