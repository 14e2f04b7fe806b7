//! Domain ports and supporting types for the hexagonal boundary.

mod comment_repository;
mod credential_hasher;
mod mailer;
mod post_repository;
mod token_issuer;
mod user_repository;

pub use comment_repository::{
    CommentRepository, CommentRepositoryError, InMemoryCommentRepository,
};
pub use credential_hasher::{CredentialHashError, CredentialHasher, FixtureCredentialHasher};
pub use mailer::{Mailer, MailerError, RecordedMail, RecordingMailer};
pub use post_repository::{InMemoryPostRepository, PostRepository, PostRepositoryError};
pub use token_issuer::{TokenIssueError, TokenIssuer, TokenPurpose, TokenRedeemError};
pub use user_repository::{InMemoryUserRepository, UserRepository, UserRepositoryError};
