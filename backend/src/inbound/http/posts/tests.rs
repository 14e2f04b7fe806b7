//! HTTP behaviour coverage for the forum endpoints.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use serde_json::{Value, json};

use crate::domain::ports::CommentRepository;
use crate::test_support::{TestBackend, test_backend};

use super::*;

async fn init(
    backend: &TestBackend,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    actix_test::init_service(crate::server::build_app(backend.app_dependencies())).await
}

async fn register_and_login<S>(app: &S, name: &str, email: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let signup_res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({
                "displayName": name,
                "email": email,
                "password": "password1",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(signup_res.status(), StatusCode::CREATED);

    let login_res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "password": "password1" }))
            .to_request(),
    )
    .await;
    assert_eq!(login_res.status(), StatusCode::OK);
    login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

async fn create_post_ok<S>(app: &S, cookie: &Cookie<'static>, title: &str) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .cookie(cookie.clone())
            .set_json(json!({ "title": title, "content": "Full question here." }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    body.get("id")
        .and_then(Value::as_str)
        .expect("post id in response")
        .to_owned()
}

async fn add_comment_ok<S>(
    app: &S,
    cookie: &Cookie<'static>,
    post_id: &str,
    text: &str,
) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{post_id}/comments"))
            .cookie(cookie.clone())
            .set_json(json!({ "body": text }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    body.get("id")
        .and_then(Value::as_str)
        .expect("comment id in response")
        .to_owned()
}

fn location_header(res: &ServiceResponse) -> &str {
    res.response()
        .headers()
        .get(header::LOCATION)
        .expect("location header present")
        .to_str()
        .expect("location header is ascii")
}

#[actix_web::test]
async fn creating_posts_requires_a_session() {
    let backend = test_backend();
    let app = init(&backend).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .set_json(json!({ "title": "T", "content": "C" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn created_posts_appear_unsolved_with_author_snapshot() {
    let backend = test_backend();
    let app = init(&backend).await;
    let cookie = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;
    let post_id = create_post_ok(&app, &cookie, "How do I sort?").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    let post = body.get("post").expect("post present");
    assert_eq!(
        post.get("authorName").and_then(Value::as_str),
        Some("Ada Lovelace")
    );
    assert!(post.get("solutionCommentId").is_none());
    assert_eq!(body.get("comments"), Some(&json!([])));
}

#[actix_web::test]
async fn malformed_post_ids_are_rejected_before_lookup() {
    let backend = test_backend();
    let app = init(&backend).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts/not-a-uuid")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn missing_posts_are_not_found() {
    let backend = test_backend();
    let app = init(&backend).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn non_author_edits_redirect_to_the_post_view() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;
    let eve = register_and_login(&app, "Eve Intruder", "eve@example.com").await;
    let post_id = create_post_ok(&app, &ada, "Original").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .cookie(eve.clone())
            .set_json(json!({ "title": "Hijacked", "content": "C" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(&res), format!("/api/v1/posts/{post_id}"));

    let delete_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .cookie(eve)
            .to_request(),
    )
    .await;
    assert_eq!(delete_res.status(), StatusCode::SEE_OTHER);

    // The post is unchanged.
    let view = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(view).await;
    assert_eq!(
        body.get("post").and_then(|p| p.get("title")).and_then(Value::as_str),
        Some("Original")
    );
}

#[actix_web::test]
async fn authors_can_edit_their_posts() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;
    let post_id = create_post_ok(&app, &ada, "Original").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .cookie(ada)
            .set_json(json!({
                "title": "Corrected",
                "content": "Updated body",
                "featuredImage": "diagram.png",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("title").and_then(Value::as_str), Some("Corrected"));
    assert_eq!(
        body.get("featuredImage").and_then(Value::as_str),
        Some("diagram.png")
    );
}

#[actix_web::test]
async fn deleting_a_post_removes_its_comments() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;
    let grace = register_and_login(&app, "Grace Hopper", "grace@example.com").await;
    let post_id = create_post_ok(&app, &ada, "Doomed").await;
    add_comment_ok(&app, &grace, &post_id, "an answer").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let view = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(view.status(), StatusCode::NOT_FOUND);

    let post = crate::domain::PostId::from_uuid(
        post_id.parse().expect("post id is a uuid"),
    );
    assert!(
        backend
            .comments
            .list_for_post(&post)
            .await
            .expect("list comments")
            .is_empty()
    );
}

#[actix_web::test]
async fn empty_comments_are_rejected() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;
    let post_id = create_post_ok(&app, &ada, "Question").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{post_id}/comments"))
            .cookie(ada)
            .set_json(json!({ "body": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    let details = body.get("details").expect("details present");
    assert_eq!(details.get("code").and_then(Value::as_str), Some("empty_body"));
}

#[actix_web::test]
async fn commenting_on_missing_posts_is_not_found() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6/comments")
            .cookie(ada)
            .set_json(json!({ "body": "hello" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn solution_marking_is_gated_on_the_post_author() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;
    let grace = register_and_login(&app, "Grace Hopper", "grace@example.com").await;
    let post_id = create_post_ok(&app, &ada, "Question").await;
    let comment_id = add_comment_ok(&app, &grace, &post_id, "the answer").await;

    // The commenter cannot accept their own answer.
    let denied = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/comments/{comment_id}/solution"))
            .cookie(grace)
            .to_request(),
    )
    .await;
    assert_eq!(denied.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(&denied), format!("/api/v1/posts/{post_id}"));

    let still_unsolved = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(still_unsolved).await;
    assert!(
        body.get("post")
            .and_then(|p| p.get("solutionCommentId"))
            .is_none()
    );

    // The post author can.
    let applied = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/comments/{comment_id}/solution"))
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(applied.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(applied).await;
    assert_eq!(
        body.get("solutionCommentId").and_then(Value::as_str),
        Some(comment_id.as_str())
    );
}

#[actix_web::test]
async fn feed_orders_by_sort_key_and_skips_solved_posts() {
    let backend = test_backend();
    let app = init(&backend).await;
    let ada = register_and_login(&app, "Ada Lovelace", "ada@example.com").await;

    let first = create_post_ok(&app, &ada, "first").await;
    let second = create_post_ok(&app, &ada, "second").await;
    let third = create_post_ok(&app, &ada, "third").await;
    let answer = add_comment_ok(&app, &ada, &second, "done").await;
    let marked = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/comments/{answer}/solution"))
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(marked.status(), StatusCode::OK);

    let oldest_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts?sort=oldest")
            .to_request(),
    )
    .await;
    assert_eq!(oldest_res.status(), StatusCode::OK);
    let oldest: Value = actix_test::read_body_json(oldest_res).await;
    let ids = |feed: &Value| -> Vec<String> {
        feed.get("posts")
            .and_then(Value::as_array)
            .expect("posts array")
            .iter()
            .filter_map(|post| post.get("id").and_then(Value::as_str))
            .map(str::to_owned)
            .collect()
    };
    assert_eq!(ids(&oldest), vec![first.clone(), third.clone()]);
    assert_eq!(
        oldest.get("sort").and_then(|s| s.get("key")).and_then(Value::as_str),
        Some("oldest")
    );
    assert_eq!(
        oldest
            .get("otherSorts")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(1)
    );

    let newest_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts?sort=newest")
            .to_request(),
    )
    .await;
    let newest: Value = actix_test::read_body_json(newest_res).await;
    assert_eq!(ids(&newest), vec![third, first]);

    // Omitting the key defaults to newest.
    let default_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/posts").to_request(),
    )
    .await;
    let default_feed: Value = actix_test::read_body_json(default_res).await;
    assert_eq!(ids(&default_feed), ids(&newest));
}

#[actix_web::test]
async fn unknown_sort_keys_are_rejected() {
    let backend = test_backend();
    let app = init(&backend).await;

    for key in ["random", "viewed"] {
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts?sort={key}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        let details = body.get("details").expect("details present");
        assert_eq!(
            details.get("code").and_then(Value::as_str),
            Some("unsupported_sort_key")
        );
    }
}
