//! PostgreSQL persistence adapters for the content and identity stores.

mod diesel_comment_repository;
mod diesel_error_mapping;
mod diesel_post_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub(crate) mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
