//! Post aggregate: content, denormalized author snapshot, and solution state.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::comment::CommentId;
use crate::domain::user::{DisplayName, User, UserId};

/// Maximum allowed length for a post title.
pub const TITLE_MAX: usize = 120;

/// Validation errors returned by the post constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyContent,
    EmptyFeaturedImage,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::EmptyFeaturedImage => {
                write!(f, "featured image reference must not be blank when present")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Stable post identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a new random [`PostId`].
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

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a post has an accepted solution.
///
/// A post starts [`SolutionState::Unsolved`]. The author may accept any
/// comment under the post, and may later accept a different one; the reference
/// is overwritten. There is no transition back to unsolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionState {
    /// No comment has been accepted yet.
    Unsolved,
    /// The referenced comment is the accepted solution.
    SolvedWith(CommentId),
}

impl SolutionState {
    /// True when no solution has been accepted.
    pub const fn is_unsolved(&self) -> bool {
        matches!(self, Self::Unsolved)
    }

    /// The accepted comment, if any.
    pub const fn comment_id(&self) -> Option<&CommentId> {
        match self {
            Self::Unsolved => None,
            Self::SolvedWith(id) => Some(id),
        }
    }
}

/// Validated title/content/image payload for creating or editing a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    content: String,
    featured_image: Option<String>,
}

impl PostDraft {
    /// Validate raw form inputs into a draft.
    pub fn try_from_parts(
        title: &str,
        content: &str,
        featured_image: Option<&str>,
    ) -> Result<Self, PostValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        let featured_image = match featured_image {
            Some(reference) => {
                let reference = reference.trim();
                if reference.is_empty() {
                    return Err(PostValidationError::EmptyFeaturedImage);
                }
                Some(reference.to_owned())
            }
            None => None,
        };
        Ok(Self {
            title: title.to_owned(),
            content: content.to_owned(),
            featured_image,
        })
    }

    /// Post title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Post body content.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Optional featured image reference.
    pub fn featured_image(&self) -> Option<&str> {
        self.featured_image.as_deref()
    }
}

/// Forum post.
///
/// ## Invariants
/// - `author_name` is a snapshot of the author's display name at creation
///   time; it is never refreshed when the author renames themselves.
/// - `solution`, once set, references a comment whose parent post is this
///   post. The forum service enforces this at marking time.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    id: PostId,
    author_id: UserId,
    author_name: DisplayName,
    title: String,
    content: String,
    featured_image: Option<String>,
    solution: SolutionState,
    created_at: DateTime<Utc>,
}

impl Post {
    /// Rehydrate a [`Post`] from stored fields.
    #[expect(clippy::too_many_arguments, reason = "row rehydration mirrors the stored columns")]
    pub fn new(
        id: PostId,
        author_id: UserId,
        author_name: DisplayName,
        title: String,
        content: String,
        featured_image: Option<String>,
        solution: SolutionState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_id,
            author_name,
            title,
            content,
            featured_image,
            solution,
            created_at,
        }
    }

    /// Create a new unsolved post, snapshotting the author's current name.
    pub fn create(author: &User, draft: PostDraft, created_at: DateTime<Utc>) -> Self {
        let PostDraft {
            title,
            content,
            featured_image,
        } = draft;
        Self {
            id: PostId::random(),
            author_id: *author.id(),
            author_name: author.display_name().clone(),
            title,
            content,
            featured_image,
            solution: SolutionState::Unsolved,
            created_at,
        }
    }

    /// Stable post identifier.
    pub const fn id(&self) -> &PostId {
        &self.id
    }

    /// Author reference; the user record may no longer exist.
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Author display name as it was at creation time.
    pub const fn author_name(&self) -> &DisplayName {
        &self.author_name
    }

    /// Post title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Post body content.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Optional featured image reference.
    pub fn featured_image(&self) -> Option<&str> {
        self.featured_image.as_deref()
    }

    /// Current solution state.
    pub const fn solution(&self) -> &SolutionState {
        &self.solution
    }

    /// When the post was created.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when the caller is the post's author.
    pub fn is_authored_by(&self, caller: &UserId) -> bool {
        &self.author_id == caller
    }

    /// Replace the editable content fields from a validated draft.
    #[must_use]
    pub fn with_draft(mut self, draft: PostDraft) -> Self {
        let PostDraft {
            title,
            content,
            featured_image,
        } = draft;
        self.title = title;
        self.content = content;
        self.featured_image = featured_image;
        self
    }

    /// Accept a comment as the solution, overwriting any earlier choice.
    #[must_use]
    pub fn solved_with(mut self, comment_id: CommentId) -> Self {
        self.solution = SolutionState::SolvedWith(comment_id);
        self
    }
}
