//! Forum API handlers: post feed, post lifecycle, comments, solutions.
//!
//! ```text
//! GET  /api/v1/posts?sort=newest
//! POST /api/v1/posts {"title":"T","content":"C"}
//! POST /api/v1/posts/{id}/comments {"body":"..."}
//! POST /api/v1/comments/{id}/solution
//! ```
//!
//! Ownership denials do not surface as errors: the handler answers with
//! `303 See Other` pointing at the post's read view, mirroring how the UI
//! bounces a non-author back to the post they tried to change.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Comment, CommentId, CommentText, CommentValidationError, Error, MutationOutcome, Post,
    PostDraft, PostId, PostSort, PostValidationError, UnsolvedFeed,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_uuid};

/// Request body for creating or editing a post.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// Post title.
    pub title: String,
    /// Post body content.
    pub content: String,
    /// Optional featured image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

/// Request body for adding a comment.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Comment text; must be non-empty.
    pub body: String,
}

/// Feed query parameters.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    /// Sort key: `newest` (default) or `oldest`.
    pub sort: Option<String>,
}

/// Post payload returned by forum endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Stable post identifier.
    pub id: String,
    /// Post title.
    pub title: String,
    /// Post body content.
    pub content: String,
    /// Optional featured image reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Author's user id.
    pub author_id: String,
    /// Author's display name as it was when the post was created.
    pub author_name: String,
    /// Accepted solution comment id; absent while unsolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_comment_id: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id().to_string(),
            title: post.title().to_owned(),
            content: post.content().to_owned(),
            featured_image: post.featured_image().map(str::to_owned),
            author_id: post.author_id().to_string(),
            author_name: post.author_name().to_string(),
            solution_comment_id: post.solution().comment_id().map(ToString::to_string),
            created_at: post.created_at().to_rfc3339(),
        }
    }
}

/// Comment payload returned by forum endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    /// Stable comment identifier.
    pub id: String,
    /// The post this comment belongs to.
    pub post_id: String,
    /// Commenter's user id.
    pub author_id: String,
    /// Commenter's display name as it was when the comment was written.
    pub author_name: String,
    /// Comment text.
    pub body: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id().to_string(),
            post_id: comment.post_id().to_string(),
            author_id: comment.author_id().to_string(),
            author_name: comment.author_name().to_string(),
            body: comment.body().to_owned(),
            created_at: comment.created_at().to_rfc3339(),
        }
    }
}

/// One sort choice offered alongside the feed.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortChoice {
    /// Stable key for the `sort` query parameter.
    pub key: String,
    /// Human-readable label.
    pub label: String,
}

impl From<PostSort> for SortChoice {
    fn from(sort: PostSort) -> Self {
        Self {
            key: sort.as_str().to_owned(),
            label: sort.label().to_owned(),
        }
    }
}

/// Unsolved feed payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    /// The ordering that was applied.
    pub sort: SortChoice,
    /// The remaining sort choices.
    pub other_sorts: Vec<SortChoice>,
    /// Unsolved posts in the requested order.
    pub posts: Vec<PostResponse>,
}

impl From<&UnsolvedFeed> for FeedResponse {
    fn from(feed: &UnsolvedFeed) -> Self {
        Self {
            sort: feed.sort.into(),
            other_sorts: feed.other_sorts.iter().copied().map(Into::into).collect(),
            posts: feed.posts.iter().map(Into::into).collect(),
        }
    }
}

/// Post-with-comments payload for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostWithCommentsResponse {
    /// The post itself.
    pub post: PostResponse,
    /// Comments in insertion order.
    pub comments: Vec<CommentResponse>,
}

fn map_post_validation_error(err: &PostValidationError) -> Error {
    let (field, code) = match err {
        PostValidationError::EmptyTitle => (FieldName::new("title"), "empty_title"),
        PostValidationError::TitleTooLong { .. } => (FieldName::new("title"), "title_too_long"),
        PostValidationError::EmptyContent => (FieldName::new("content"), "empty_content"),
        PostValidationError::EmptyFeaturedImage => {
            (FieldName::new("featuredImage"), "empty_featured_image")
        }
    };
    field_error(field, code, err.to_string())
}

fn map_comment_validation_error(err: &CommentValidationError) -> Error {
    let code = match err {
        CommentValidationError::EmptyBody => "empty_body",
        CommentValidationError::BodyTooLong { .. } => "body_too_long",
    };
    field_error(FieldName::new("body"), code, err.to_string())
}

fn parse_draft(body: PostRequest) -> Result<PostDraft, Error> {
    PostDraft::try_from_parts(&body.title, &body.content, body.featured_image.as_deref())
        .map_err(|err| map_post_validation_error(&err))
}

fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    parse_uuid(raw, FieldName::new("postId")).map(PostId::from_uuid)
}

fn parse_comment_id(raw: &str) -> Result<CommentId, Error> {
    parse_uuid(raw, FieldName::new("commentId")).map(CommentId::from_uuid)
}

fn parse_sort(query: &FeedQuery) -> Result<PostSort, Error> {
    match query.sort.as_deref() {
        None => Ok(PostSort::Newest),
        Some(raw) => raw.parse().map_err(|err: crate::domain::SortKeyError| {
            field_error(FieldName::new("sort"), "unsupported_sort_key", err.to_string())
        }),
    }
}

/// Redirect a denied caller to the post's read-only view.
fn see_other(post_id: &PostId) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/api/v1/posts/{post_id}")))
        .finish()
}

/// The public feed of unsolved posts.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(FeedQuery),
    responses(
        (status = 200, description = "Unsolved posts", body = FeedResponse),
        (status = 400, description = "Unsupported sort key", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    query: web::Query<FeedQuery>,
) -> ApiResult<web::Json<FeedResponse>> {
    let sort = parse_sort(&query)?;
    let feed = state.forum.list_unsolved(sort).await?;
    Ok(web::Json(FeedResponse::from(&feed)))
}

/// Create a new post authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = parse_draft(payload.into_inner())?;
    let post = state.forum.create_post(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(&post)))
}

/// Fetch a post together with its comments.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post with comments", body = PostWithCommentsResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "viewPost",
    security([])
)]
#[get("/posts/{post_id}")]
pub async fn view_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostWithCommentsResponse>> {
    let post_id = parse_post_id(&path)?;
    let (post, comments) = state.forum.post_with_comments(&post_id).await?;
    Ok(web::Json(PostWithCommentsResponse {
        post: PostResponse::from(&post),
        comments: comments.iter().map(Into::into).collect(),
    }))
}

/// Replace a post's title/content/image, author only.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 303, description = "Caller is not the author; redirected to the post"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "editPost"
)]
#[put("/posts/{post_id}")]
pub async fn edit_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    let draft = parse_draft(payload.into_inner())?;
    match state.forum.edit_post(&user_id, &post_id, draft).await? {
        MutationOutcome::Applied(post) => Ok(HttpResponse::Ok().json(PostResponse::from(&post))),
        MutationOutcome::Denied { post_id: target } => Ok(see_other(&target)),
    }
}

/// Delete a post and every comment under it, author only.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Post and its comments deleted"),
        (status = 303, description = "Caller is not the author; redirected to the post"),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{post_id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    match state.forum.delete_post(&user_id, &post_id).await? {
        MutationOutcome::Applied(_) => Ok(HttpResponse::NoContent().finish()),
        MutationOutcome::Denied { post_id: target } => Ok(see_other(&target)),
    }
}

/// Attach a comment to an existing post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{postId}/comments",
    params(("postId" = String, Path, description = "Post identifier")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "addComment"
)]
#[post("/posts/{post_id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    let body = CommentText::new(payload.into_inner().body)
        .map_err(|err| map_comment_validation_error(&err))?;
    let comment = state.forum.add_comment(&user_id, &post_id, body).await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(&comment)))
}

/// Accept a comment as its post's solution, post author only.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{commentId}/solution",
    params(("commentId" = String, Path, description = "Comment identifier")),
    responses(
        (status = 200, description = "Solution recorded", body = PostResponse),
        (status = 303, description = "Caller is not the post author; redirected to the post"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Comment or post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "markSolution"
)]
#[post("/comments/{comment_id}/solution")]
pub async fn mark_solution(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let comment_id = parse_comment_id(&path)?;
    match state.forum.mark_solution(&user_id, &comment_id).await? {
        MutationOutcome::Applied(post) => Ok(HttpResponse::Ok().json(PostResponse::from(&post))),
        MutationOutcome::Denied { post_id: target } => Ok(see_other(&target)),
    }
}

#[cfg(test)]
mod tests;
