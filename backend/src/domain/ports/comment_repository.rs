//! Port abstraction for comment persistence adapters and their errors.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, PostId, UserId};

/// Persistence errors raised by comment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentRepositoryError {
    /// Repository connection could not be established.
    #[error("comment repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("comment repository query failed: {message}")]
    Query { message: String },
}

impl CommentRepositoryError {
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
}

/// Content store port for comments.
///
/// There is deliberately no update operation: comments are write-once, and
/// the only removal paths are the cascade deletes below.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment record.
    async fn insert(&self, comment: &Comment) -> Result<(), CommentRepositoryError>;

    /// Fetch a comment by identifier.
    async fn find_by_id(&self, id: &CommentId)
    -> Result<Option<Comment>, CommentRepositoryError>;

    /// All comments under a post in natural insertion order (oldest first).
    async fn list_for_post(&self, post_id: &PostId)
    -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Delete every comment under any of the given posts.
    async fn delete_for_posts(&self, post_ids: &[PostId]) -> Result<(), CommentRepositoryError>;

    /// Delete every comment written by the given author.
    async fn delete_by_author(&self, author: &UserId) -> Result<(), CommentRepositoryError>;
}

/// In-memory comment store for tests and database-less development runs.
#[derive(Debug, Default)]
pub struct InMemoryCommentRepository {
    comments: Mutex<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Comment>>, CommentRepositoryError> {
        self.comments
            .lock()
            .map_err(|_| CommentRepositoryError::query("comment store lock poisoned"))
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), CommentRepositoryError> {
        self.lock()?.push(comment.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let comments = self.lock()?;
        Ok(comments.iter().find(|comment| comment.id() == id).cloned())
    }

    async fn list_for_post(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let comments = self.lock()?;
        Ok(comments
            .iter()
            .filter(|comment| comment.post_id() == post_id)
            .cloned()
            .collect())
    }

    async fn delete_for_posts(&self, post_ids: &[PostId]) -> Result<(), CommentRepositoryError> {
        self.lock()?
            .retain(|comment| !post_ids.contains(comment.post_id()));
        Ok(())
    }

    async fn delete_by_author(&self, author: &UserId) -> Result<(), CommentRepositoryError> {
        self.lock()?.retain(|comment| comment.author_id() != author);
        Ok(())
    }
}
