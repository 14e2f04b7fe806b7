//! Comment entity attached to a post.
//!
//! Comments are write-once: there is no edit path, and removal only happens
//! as a cascade of post or account deletion.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::post::PostId;
use crate::domain::user::{DisplayName, User, UserId};

/// Maximum allowed length for a comment body.
pub const COMMENT_MAX: usize = 4000;

/// Validation errors returned by the comment constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    EmptyBody,
    BodyTooLong { max: usize },
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "comment text must not be empty"),
            Self::BodyTooLong { max } => {
                write!(f, "comment text must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Stable comment identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentId(Uuid);

impl CommentId {
    /// Generate a new random [`CommentId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty comment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    /// Validate raw comment input.
    ///
    /// The text is required to be non-empty once trimmed; accepting blank
    /// comments would let a post accept an empty string as its solution.
    pub fn new(text: impl Into<String>) -> Result<Self, CommentValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        if text.chars().count() > COMMENT_MAX {
            return Err(CommentValidationError::BodyTooLong { max: COMMENT_MAX });
        }
        Ok(Self(text))
    }
}

impl AsRef<str> for CommentText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}

/// Comment left under a post.
///
/// ## Invariants
/// - `author_name` is a snapshot of the commenter's display name at creation
///   time; it is never refreshed when the commenter renames themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    id: CommentId,
    post_id: PostId,
    author_id: UserId,
    author_name: DisplayName,
    body: CommentText,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Rehydrate a [`Comment`] from stored fields.
    pub fn new(
        id: CommentId,
        post_id: PostId,
        author_id: UserId,
        author_name: DisplayName,
        body: CommentText,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            author_id,
            author_name,
            body,
            created_at,
        }
    }

    /// Create a new comment, snapshotting the commenter's current name.
    pub fn create(
        post_id: PostId,
        author: &User,
        body: CommentText,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::random(),
            post_id,
            author_id: *author.id(),
            author_name: author.display_name().clone(),
            body,
            created_at,
        }
    }

    /// Stable comment identifier.
    pub const fn id(&self) -> &CommentId {
        &self.id
    }

    /// The post this comment belongs to.
    pub const fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Commenter reference; the user record may no longer exist.
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Commenter display name as it was at creation time.
    pub const fn author_name(&self) -> &DisplayName {
        &self.author_name
    }

    /// Comment text.
    pub fn body(&self) -> &str {
        self.body.as_ref()
    }

    /// When the comment was written.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::test_fixtures::fixture_user;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn comment_text_rejects_blank_input(#[case] raw: &str) {
        let err = CommentText::new(raw).expect_err("blank text must fail");
        assert_eq!(err, CommentValidationError::EmptyBody);
    }

    #[test]
    fn comment_text_rejects_overlong_input() {
        let raw = "c".repeat(COMMENT_MAX + 1);
        let err = CommentText::new(raw).expect_err("overlong text must fail");
        assert_eq!(err, CommentValidationError::BodyTooLong { max: COMMENT_MAX });
    }

    #[test]
    fn create_snapshots_commenter_name() {
        let commenter = fixture_user("Grace Hopper", "grace@example.com");
        let post_id = PostId::random();
        let comment = Comment::create(
            post_id,
            &commenter,
            CommentText::new("Use merge sort.").expect("valid text"),
            Utc::now(),
        );

        assert_eq!(comment.post_id(), &post_id);
        assert_eq!(comment.author_id(), commenter.id());
        assert_eq!(comment.author_name().as_ref(), "Grace Hopper");
        assert_eq!(comment.body(), "Use merge sort.");
    }
}
