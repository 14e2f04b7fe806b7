//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities (users, posts, comments), the
//! validation rules guarding them, and the policy services that gate every
//! mutation. Persistence, hashing, email, and token signing are reached only
//! through the ports in [`ports`].

pub mod accounts;
pub mod auth;
pub mod comment;
pub mod error;
pub mod forum;
pub mod ports;
pub mod post;
pub mod sort;
pub mod trace_id;
pub mod user;

pub use self::accounts::{AccountPolicy, AccountService, ProfileUpdate};
pub use self::auth::{AuthValidationError, LoginCredentials, Password, Signup};
pub use self::comment::{Comment, CommentId, CommentText, CommentValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::forum::{ForumService, MutationOutcome, UnsolvedFeed};
pub use self::post::{Post, PostDraft, PostId, PostValidationError, SolutionState};
pub use self::sort::{PostSort, SortKeyError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, EmailAddress, PasswordHash, User, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! Shared builders for domain-level tests.

    use chrono::Utc;

    use super::user::{DisplayName, EmailAddress, PasswordHash, User};

    /// Build a user with the given name and email and a placeholder hash.
    pub(crate) fn fixture_user(name: &str, email: &str) -> User {
        User::sign_up(
            DisplayName::new(name).expect("valid fixture name"),
            EmailAddress::new(email).expect("valid fixture email"),
            PasswordHash::new("plain$fixture").expect("valid fixture hash"),
            Utc::now(),
        )
    }
}
