//! Port abstraction for post persistence adapters and their errors.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CommentId, Post, PostId, UserId};

/// Persistence errors raised by post repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostRepositoryError {
    /// Repository connection could not be established.
    #[error("post repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("post repository query failed: {message}")]
    Query { message: String },
}

impl PostRepositoryError {
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

/// Content store port for posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post record.
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// All unsolved posts in natural insertion order (oldest first).
    async fn list_unsolved(&self) -> Result<Vec<Post>, PostRepositoryError>;

    /// Replace the editable content fields of the stored post.
    async fn update_content(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Record the accepted solution comment for a post.
    async fn set_solution(
        &self,
        id: &PostId,
        comment_id: &CommentId,
    ) -> Result<(), PostRepositoryError>;

    /// Delete the post with the given id, if present.
    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError>;

    /// Delete every post by the given author, returning the removed ids so
    /// the caller can cascade to their comments.
    async fn delete_by_author(&self, author: &UserId) -> Result<Vec<PostId>, PostRepositoryError>;
}

/// In-memory post store for tests and database-less development runs.
///
/// Posts are held in insertion order, which doubles as the feed's natural
/// ordering.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
}

impl InMemoryPostRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Post>>, PostRepositoryError> {
        self.posts
            .lock()
            .map_err(|_| PostRepositoryError::query("post store lock poisoned"))
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        self.lock()?.push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let posts = self.lock()?;
        Ok(posts.iter().find(|post| post.id() == id).cloned())
    }

    async fn list_unsolved(&self) -> Result<Vec<Post>, PostRepositoryError> {
        let posts = self.lock()?;
        Ok(posts
            .iter()
            .filter(|post| post.solution().is_unsolved())
            .cloned()
            .collect())
    }

    async fn update_content(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut posts = self.lock()?;
        match posts.iter_mut().find(|stored| stored.id() == post.id()) {
            Some(stored) => {
                *stored = post.clone();
                Ok(())
            }
            None => Err(PostRepositoryError::query("post not found for update")),
        }
    }

    async fn set_solution(
        &self,
        id: &PostId,
        comment_id: &CommentId,
    ) -> Result<(), PostRepositoryError> {
        let mut posts = self.lock()?;
        match posts.iter_mut().find(|stored| stored.id() == id) {
            Some(stored) => {
                *stored = stored.clone().solved_with(*comment_id);
                Ok(())
            }
            None => Err(PostRepositoryError::query("post not found for update")),
        }
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        self.lock()?.retain(|post| post.id() != id);
        Ok(())
    }

    async fn delete_by_author(&self, author: &UserId) -> Result<Vec<PostId>, PostRepositoryError> {
        let mut posts = self.lock()?;
        let removed = posts
            .iter()
            .filter(|post| post.author_id() == author)
            .map(|post| *post.id())
            .collect();
        posts.retain(|post| post.author_id() != author);
        Ok(removed)
    }
}
