//! PostgreSQL-backed `CommentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentId, CommentText, DisplayName, PostId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::comments;

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        CommentRepositoryError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))
    }
}

fn map_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}

/// Convert a database row to a domain comment.
fn row_to_comment(row: CommentRow) -> Result<Comment, CommentRepositoryError> {
    let author_name = DisplayName::new(row.author_name).map_err(|err| {
        CommentRepositoryError::query(format!("stored author name invalid: {err}"))
    })?;
    let body = CommentText::new(row.body)
        .map_err(|err| CommentRepositoryError::query(format!("stored body invalid: {err}")))?;
    Ok(Comment::new(
        CommentId::from_uuid(row.id),
        PostId::from_uuid(row.post_id),
        UserId::from_uuid(row.author_id),
        author_name,
        body,
        row.created_at,
    ))
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), CommentRepositoryError> {
        let mut conn = self.conn().await?;

        let new_row = NewCommentRow {
            id: *comment.id().as_uuid(),
            post_id: *comment.post_id().as_uuid(),
            author_id: *comment.author_id().as_uuid(),
            author_name: comment.author_name().as_ref(),
            body: comment.body(),
            created_at: comment.created_at(),
        };

        diesel::insert_into(comments::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn find_by_id(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self.conn().await?;

        let row: Option<CommentRow> = comments::table
            .filter(comments::id.eq(id.as_uuid()))
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_comment).transpose()
    }

    async fn list_for_post(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self.conn().await?;

        let rows: Vec<CommentRow> = comments::table
            .filter(comments::post_id.eq(post_id.as_uuid()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter().map(row_to_comment).collect()
    }

    async fn delete_for_posts(&self, post_ids: &[PostId]) -> Result<(), CommentRepositoryError> {
        if post_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;

        let uuids: Vec<Uuid> = post_ids.iter().map(|id| *id.as_uuid()).collect();
        diesel::delete(comments::table.filter(comments::post_id.eq_any(uuids)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn delete_by_author(&self, author: &UserId) -> Result<(), CommentRepositoryError> {
        let mut conn = self.conn().await?;

        diesel::delete(comments::table.filter(comments::author_id.eq(author.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }
}
