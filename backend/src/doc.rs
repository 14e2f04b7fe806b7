//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers every HTTP endpoint from the
//! inbound layer (accounts, posts, health), the request/response schemas, and
//! the session cookie security scheme.
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::posts::{
    CommentRequest, CommentResponse, FeedResponse, PostRequest, PostResponse,
    PostWithCommentsResponse, SortChoice,
};
use crate::inbound::http::users::{
    CompletePasswordResetRequest, ConfirmEmailRequest, LoginRequest, PasswordResetRequest,
    ProfileResponse, SignupRequest, UpdateProfileRequest,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Forum backend API",
        description = "HTTP interface for the forum: accounts, posts, comments, and solutions.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::delete_profile,
        crate::inbound::http::users::confirm_email,
        crate::inbound::http::users::resend_confirmation,
        crate::inbound::http::users::request_password_reset,
        crate::inbound::http::users::complete_password_reset,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::view_post,
        crate::inbound::http::posts::edit_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::add_comment,
        crate::inbound::http::posts::mark_solution,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SignupRequest,
        LoginRequest,
        UpdateProfileRequest,
        ConfirmEmailRequest,
        PasswordResetRequest,
        CompletePasswordResetRequest,
        ProfileResponse,
        PostRequest,
        CommentRequest,
        PostResponse,
        CommentResponse,
        SortChoice,
        FeedResponse,
        PostWithCommentsResponse,
    )),
    tags(
        (name = "accounts", description = "Signup, login, profile, confirmation, and reset"),
        (name = "posts", description = "Post feed, post lifecycle, comments, and solutions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;

    #[test]
    fn every_handler_path_is_registered() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/signup",
            "/api/v1/login",
            "/api/v1/logout",
            "/api/v1/profile",
            "/api/v1/confirm-email",
            "/api/v1/confirm-email/resend",
            "/api/v1/password-reset",
            "/api/v1/password-reset/complete",
            "/api/v1/posts",
            "/api/v1/posts/{postId}",
            "/api/v1/posts/{postId}/comments",
            "/api/v1/comments/{commentId}/solution",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path in OpenAPI document: {path}"
            );
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.schemas.contains_key("Error"));
        assert!(components.schemas.contains_key("ErrorCode"));
    }
}
