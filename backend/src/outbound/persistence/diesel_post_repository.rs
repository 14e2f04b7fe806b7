//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{CommentId, DisplayName, Post, PostId, SolutionState, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPostRow, PostContentUpdate, PostRow};
use super::pool::DbPool;
use super::schema::posts;

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        PostRepositoryError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PostRepositoryError::connection))
    }
}

fn map_error(error: diesel::result::Error) -> PostRepositoryError {
    map_diesel_error(
        error,
        PostRepositoryError::query,
        PostRepositoryError::connection,
    )
}

/// Convert a database row to a domain post.
fn row_to_post(row: PostRow) -> Result<Post, PostRepositoryError> {
    let author_name = DisplayName::new(row.author_name)
        .map_err(|err| PostRepositoryError::query(format!("stored author name invalid: {err}")))?;
    let solution = match row.solution_comment_id {
        Some(comment_id) => SolutionState::SolvedWith(CommentId::from_uuid(comment_id)),
        None => SolutionState::Unsolved,
    };
    Ok(Post::new(
        PostId::from_uuid(row.id),
        UserId::from_uuid(row.author_id),
        author_name,
        row.title,
        row.content,
        row.featured_image,
        solution,
        row.created_at,
    ))
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut conn = self.conn().await?;

        let new_row = NewPostRow {
            id: *post.id().as_uuid(),
            author_id: *post.author_id().as_uuid(),
            author_name: post.author_name().as_ref(),
            title: post.title(),
            content: post.content(),
            featured_image: post.featured_image(),
            solution_comment_id: post.solution().comment_id().map(|id| *id.as_uuid()),
            created_at: post.created_at(),
        };

        diesel::insert_into(posts::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.conn().await?;

        let row: Option<PostRow> = posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_post).transpose()
    }

    async fn list_unsolved(&self) -> Result<Vec<Post>, PostRepositoryError> {
        let mut conn = self.conn().await?;

        // Creation time with the id as a tie-break approximates insertion
        // order for rows created within the same timestamp tick.
        let rows: Vec<PostRow> = posts::table
            .filter(posts::solution_comment_id.is_null())
            .order((posts::created_at.asc(), posts::id.asc()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter().map(row_to_post).collect()
    }

    async fn update_content(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut conn = self.conn().await?;

        let update = PostContentUpdate {
            title: post.title(),
            content: post.content(),
            featured_image: Some(post.featured_image()),
        };

        let updated = diesel::update(posts::table.filter(posts::id.eq(post.id().as_uuid())))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;

        if updated == 0 {
            return Err(PostRepositoryError::query("post not found for update"));
        }
        Ok(())
    }

    async fn set_solution(
        &self,
        id: &PostId,
        comment_id: &CommentId,
    ) -> Result<(), PostRepositoryError> {
        let mut conn = self.conn().await?;

        let updated = diesel::update(posts::table.filter(posts::id.eq(id.as_uuid())))
            .set(posts::solution_comment_id.eq(comment_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;

        if updated == 0 {
            return Err(PostRepositoryError::query("post not found for update"));
        }
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        let mut conn = self.conn().await?;

        diesel::delete(posts::table.filter(posts::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn delete_by_author(&self, author: &UserId) -> Result<Vec<PostId>, PostRepositoryError> {
        let mut conn = self.conn().await?;

        let removed: Vec<Uuid> =
            diesel::delete(posts::table.filter(posts::author_id.eq(author.as_uuid())))
                .returning(posts::id)
                .get_results(&mut conn)
                .await
                .map_err(map_error)?;

        Ok(removed.into_iter().map(PostId::from_uuid).collect())
    }
}
