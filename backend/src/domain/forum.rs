//! Forum service: post/comment lifecycle, ownership gating, and feed policy.
//!
//! This is the authorization and lifecycle core. Every mutation of a post is
//! gated on the caller being its author; a denied attempt is a modelled
//! outcome (the HTTP adapter answers it with a redirect to the post's read
//! view), while a missing target is a distinct not-found error checked before
//! ownership.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, PostRepository, PostRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Comment, CommentId, CommentText, Error, Post, PostDraft, PostId, PostSort, User, UserId,
};

/// Result of an ownership-gated mutation attempt.
///
/// `Denied` carries the post id so adapters can redirect the caller to the
/// read-only view of the entity they tried to change.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    /// The caller owned the post and the mutation was applied.
    Applied(T),
    /// The caller is not the post's author; nothing was changed.
    Denied {
        /// The post the caller should be redirected to.
        post_id: PostId,
    },
}

/// Unsolved post feed under a caller-chosen ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsolvedFeed {
    /// The ordering that was applied.
    pub sort: PostSort,
    /// The remaining sort choices, for presentation alongside the feed.
    pub other_sorts: Vec<PostSort>,
    /// Unsolved posts in the requested order.
    pub posts: Vec<Post>,
}

/// Authorization and lifecycle core over the content and identity stores.
#[derive(Clone)]
pub struct ForumService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => Error::service_unavailable(message),
        UserRepositoryError::Query { message } => Error::internal(message),
        UserRepositoryError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email: {email}"))
        }
    }
}

fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => Error::service_unavailable(message),
        PostRepositoryError::Query { message } => Error::internal(message),
    }
}

fn map_comment_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => Error::service_unavailable(message),
        CommentRepositoryError::Query { message } => Error::internal(message),
    }
}

impl ForumService {
    /// Create a new service over the given stores.
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    /// Resolve the caller to a live user record.
    ///
    /// A session can outlive its account (profile deletion); treat that as a
    /// stale login rather than a server fault.
    async fn require_caller(&self, caller: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(caller)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn require_post(&self, post_id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found("post not found"))
    }

    /// Create a new unsolved post authored by the caller.
    ///
    /// The caller's current display name is denormalized into the post and
    /// never refreshed afterwards.
    pub async fn create_post(&self, caller: &UserId, draft: PostDraft) -> Result<Post, Error> {
        let author = self.require_caller(caller).await?;
        let post = Post::create(&author, draft, Utc::now());
        self.posts.insert(&post).await.map_err(map_post_error)?;
        Ok(post)
    }

    /// Fetch a post together with its comments in insertion order.
    pub async fn post_with_comments(
        &self,
        post_id: &PostId,
    ) -> Result<(Post, Vec<Comment>), Error> {
        let post = self.require_post(post_id).await?;
        let comments = self
            .comments
            .list_for_post(post_id)
            .await
            .map_err(map_comment_error)?;
        Ok((post, comments))
    }

    /// The public feed of unsolved posts under the chosen ordering.
    ///
    /// `oldest` preserves natural insertion order; `newest` reverses it. The
    /// feed also reports the complement of the chosen key so callers can
    /// present the other available orderings.
    pub async fn list_unsolved(&self, sort: PostSort) -> Result<UnsolvedFeed, Error> {
        let mut posts = self.posts.list_unsolved().await.map_err(map_post_error)?;
        if sort == PostSort::Newest {
            posts.reverse();
        }
        Ok(UnsolvedFeed {
            sort,
            other_sorts: sort.others(),
            posts,
        })
    }

    /// Replace a post's title/content/image, author only.
    pub async fn edit_post(
        &self,
        caller: &UserId,
        post_id: &PostId,
        draft: PostDraft,
    ) -> Result<MutationOutcome<Post>, Error> {
        let post = self.require_post(post_id).await?;
        if !post.is_authored_by(caller) {
            return Ok(MutationOutcome::Denied { post_id: *post_id });
        }
        let edited = post.with_draft(draft);
        self.posts
            .update_content(&edited)
            .await
            .map_err(map_post_error)?;
        Ok(MutationOutcome::Applied(edited))
    }

    /// Delete a post and every comment under it, author only. Irreversible.
    pub async fn delete_post(
        &self,
        caller: &UserId,
        post_id: &PostId,
    ) -> Result<MutationOutcome<PostId>, Error> {
        let post = self.require_post(post_id).await?;
        if !post.is_authored_by(caller) {
            return Ok(MutationOutcome::Denied { post_id: *post_id });
        }
        self.comments
            .delete_for_posts(&[*post_id])
            .await
            .map_err(map_comment_error)?;
        self.posts.delete(post_id).await.map_err(map_post_error)?;
        Ok(MutationOutcome::Applied(*post_id))
    }

    /// Attach a comment to an existing post.
    ///
    /// Any authenticated caller may comment on any post, including their own.
    pub async fn add_comment(
        &self,
        caller: &UserId,
        post_id: &PostId,
        body: CommentText,
    ) -> Result<Comment, Error> {
        let author = self.require_caller(caller).await?;
        let post = self.require_post(post_id).await?;
        let comment = Comment::create(*post.id(), &author, body, Utc::now());
        self.comments
            .insert(&comment)
            .await
            .map_err(map_comment_error)?;
        Ok(comment)
    }

    /// Accept a comment as its post's solution.
    ///
    /// The comment is resolved first, then its parent post; the gate is the
    /// post's author, not the comment's. Any comment under the post
    /// qualifies, and re-marking overwrites the earlier choice.
    pub async fn mark_solution(
        &self,
        caller: &UserId,
        comment_id: &CommentId,
    ) -> Result<MutationOutcome<Post>, Error> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await
            .map_err(map_comment_error)?
            .ok_or_else(|| Error::not_found("comment not found"))?;
        let post = self.require_post(comment.post_id()).await?;
        if !post.is_authored_by(caller) {
            return Ok(MutationOutcome::Denied {
                post_id: *post.id(),
            });
        }
        self.posts
            .set_solution(post.id(), comment_id)
            .await
            .map_err(map_post_error)?;
        Ok(MutationOutcome::Applied(post.solved_with(*comment_id)))
    }

    /// Remove everything a departing user authored: their posts (with all
    /// comments under those posts) and their comments elsewhere.
    pub async fn purge_author(&self, author: &UserId) -> Result<(), Error> {
        let removed_posts = self
            .posts
            .delete_by_author(author)
            .await
            .map_err(map_post_error)?;
        if !removed_posts.is_empty() {
            self.comments
                .delete_for_posts(&removed_posts)
                .await
                .map_err(map_comment_error)?;
        }
        self.comments
            .delete_by_author(author)
            .await
            .map_err(map_comment_error)
    }
}

#[cfg(test)]
mod tests;
