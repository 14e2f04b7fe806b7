//! Behaviour coverage for the forum service against in-memory stores.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository,
};
use crate::domain::test_fixtures::fixture_user;

struct Harness {
    users: Arc<InMemoryUserRepository>,
    posts: Arc<InMemoryPostRepository>,
    comments: Arc<InMemoryCommentRepository>,
    service: ForumService,
}

impl Harness {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        let comments = Arc::new(InMemoryCommentRepository::new());
        let service = ForumService::new(users.clone(), posts.clone(), comments.clone());
        Self {
            users,
            posts,
            comments,
            service,
        }
    }

    async fn register(&self, name: &str, email: &str) -> User {
        let user = fixture_user(name, email);
        self.users.insert(&user).await.expect("register user");
        user
    }

    async fn post_as(&self, author: &User, title: &str) -> Post {
        let draft = PostDraft::try_from_parts(title, "body text", None).expect("valid draft");
        self.service
            .create_post(author.id(), draft)
            .await
            .expect("create post")
    }

    async fn comment_as(&self, author: &User, post_id: &PostId, body: &str) -> Comment {
        self.service
            .add_comment(
                author.id(),
                post_id,
                CommentText::new(body).expect("valid text"),
            )
            .await
            .expect("add comment")
    }
}

fn draft(title: &str) -> PostDraft {
    PostDraft::try_from_parts(title, "edited body", None).expect("valid draft")
}

#[tokio::test]
async fn create_post_starts_unsolved_with_name_snapshot() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let post = harness.post_as(&ada, "How do I sort?").await;

    assert!(post.solution().is_unsolved());
    assert_eq!(post.author_name().as_ref(), "Ada Lovelace");

    let (stored, comments) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert_eq!(stored, post);
    assert!(comments.is_empty());
}

#[tokio::test]
async fn create_post_requires_a_live_account() {
    let harness = Harness::new();
    let ghost = UserId::random();
    let err = harness
        .service
        .create_post(&ghost, draft("title"))
        .await
        .expect_err("unknown caller must fail");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn edit_by_non_author_is_denied_and_post_unchanged() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let eve = harness.register("Eve Intruder", "eve@example.com").await;
    let post = harness.post_as(&ada, "Original title").await;

    let outcome = harness
        .service
        .edit_post(eve.id(), post.id(), draft("Hijacked"))
        .await
        .expect("edit resolves");
    assert_eq!(
        outcome,
        MutationOutcome::Denied {
            post_id: *post.id()
        }
    );

    let (stored, _) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert_eq!(stored.title(), "Original title");
}

#[tokio::test]
async fn edit_by_author_is_reflected_on_next_read() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let post = harness.post_as(&ada, "Original title").await;

    let outcome = harness
        .service
        .edit_post(ada.id(), post.id(), draft("Corrected title"))
        .await
        .expect("edit resolves");
    let MutationOutcome::Applied(edited) = outcome else {
        panic!("author edit should be applied");
    };
    assert_eq!(edited.title(), "Corrected title");

    let (stored, _) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert_eq!(stored.title(), "Corrected title");
    assert_eq!(stored.content(), "edited body");
}

#[tokio::test]
async fn edit_of_missing_post_is_not_found_before_ownership() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;

    let err = harness
        .service
        .edit_post(ada.id(), &PostId::random(), draft("whatever"))
        .await
        .expect_err("missing post must be not-found");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_by_non_author_is_denied() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let eve = harness.register("Eve Intruder", "eve@example.com").await;
    let post = harness.post_as(&ada, "Keep me").await;

    let outcome = harness
        .service
        .delete_post(eve.id(), post.id())
        .await
        .expect("delete resolves");
    assert!(matches!(outcome, MutationOutcome::Denied { .. }));
    assert!(
        harness
            .service
            .post_with_comments(post.id())
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn delete_cascades_to_every_comment_on_the_post() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let grace = harness.register("Grace Hopper", "grace@example.com").await;
    let post = harness.post_as(&ada, "Doomed").await;
    let other = harness.post_as(&grace, "Surviving").await;
    harness.comment_as(&grace, post.id(), "first").await;
    harness.comment_as(&ada, post.id(), "second").await;
    let surviving_comment = harness.comment_as(&ada, other.id(), "elsewhere").await;

    let outcome = harness
        .service
        .delete_post(ada.id(), post.id())
        .await
        .expect("delete resolves");
    assert_eq!(outcome, MutationOutcome::Applied(*post.id()));

    let err = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect_err("deleted post must be gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(
        harness
            .comments
            .list_for_post(post.id())
            .await
            .expect("list comments")
            .is_empty()
    );

    // Comments on other posts are untouched.
    let (_, remaining) = harness
        .service
        .post_with_comments(other.id())
        .await
        .expect("view other post");
    assert_eq!(remaining, vec![surviving_comment]);
}

#[tokio::test]
async fn anyone_may_comment_including_the_author() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let grace = harness.register("Grace Hopper", "grace@example.com").await;
    let post = harness.post_as(&ada, "Question").await;

    harness.comment_as(&grace, post.id(), "an answer").await;
    harness.comment_as(&ada, post.id(), "my own note").await;

    let (_, comments) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert_eq!(comments.len(), 2);
    assert_eq!(
        comments.first().map(|c| c.author_name().as_ref()),
        Some("Grace Hopper")
    );
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;

    let err = harness
        .service
        .add_comment(
            ada.id(),
            &PostId::random(),
            CommentText::new("hello").expect("valid text"),
        )
        .await
        .expect_err("missing post must fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn mark_solution_is_gated_on_the_post_author() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let grace = harness.register("Grace Hopper", "grace@example.com").await;
    let post = harness.post_as(&ada, "Question").await;
    let comment = harness.comment_as(&grace, post.id(), "the answer").await;

    // The comment's own author cannot accept it.
    let denied = harness
        .service
        .mark_solution(grace.id(), comment.id())
        .await
        .expect("marking resolves");
    assert!(matches!(denied, MutationOutcome::Denied { .. }));
    let (unchanged, _) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert!(unchanged.solution().is_unsolved());

    // The post author can.
    let applied = harness
        .service
        .mark_solution(ada.id(), comment.id())
        .await
        .expect("marking resolves");
    let MutationOutcome::Applied(solved) = applied else {
        panic!("author marking should be applied");
    };
    assert_eq!(solved.solution().comment_id(), Some(comment.id()));

    let (stored, _) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert_eq!(stored.solution().comment_id(), Some(comment.id()));
}

#[tokio::test]
async fn authors_may_accept_their_own_comment() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let post = harness.post_as(&ada, "Self answered").await;
    let comment = harness.comment_as(&ada, post.id(), "solved it myself").await;

    let outcome = harness
        .service
        .mark_solution(ada.id(), comment.id())
        .await
        .expect("marking resolves");
    assert!(matches!(outcome, MutationOutcome::Applied(_)));
}

#[tokio::test]
async fn remarking_overwrites_the_solution_reference() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let grace = harness.register("Grace Hopper", "grace@example.com").await;
    let post = harness.post_as(&ada, "Question").await;
    let first = harness.comment_as(&grace, post.id(), "first try").await;
    let second = harness.comment_as(&grace, post.id(), "better answer").await;

    for comment in [&first, &second] {
        let outcome = harness
            .service
            .mark_solution(ada.id(), comment.id())
            .await
            .expect("marking resolves");
        assert!(matches!(outcome, MutationOutcome::Applied(_)));
    }

    let (stored, _) = harness
        .service
        .post_with_comments(post.id())
        .await
        .expect("view post");
    assert_eq!(stored.solution().comment_id(), Some(second.id()));
}

#[tokio::test]
async fn mark_solution_on_missing_comment_is_not_found() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;

    let err = harness
        .service
        .mark_solution(ada.id(), &CommentId::random())
        .await
        .expect_err("missing comment must fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn feed_filters_to_unsolved_and_orders_by_key() {
    let harness = Harness::new();
    let ada = harness.register("Ada Lovelace", "ada@example.com").await;
    let first = harness.post_as(&ada, "first").await;
    let second = harness.post_as(&ada, "second").await;
    let third = harness.post_as(&ada, "third").await;
    let answer = harness.comment_as(&ada, second.id(), "done").await;
    let marked = harness
        .service
        .mark_solution(ada.id(), answer.id())
        .await
        .expect("marking resolves");
    assert!(matches!(marked, MutationOutcome::Applied(_)));

    let oldest = harness
        .service
        .list_unsolved(PostSort::Oldest)
        .await
        .expect("oldest feed");
    let oldest_ids: Vec<PostId> = oldest.posts.iter().map(|post| *post.id()).collect();
    assert_eq!(oldest_ids, vec![*first.id(), *third.id()]);
    assert_eq!(oldest.other_sorts, vec![PostSort::Newest]);

    let newest = harness
        .service
        .list_unsolved(PostSort::Newest)
        .await
        .expect("newest feed");
    let newest_ids: Vec<PostId> = newest.posts.iter().map(|post| *post.id()).collect();
    let mut reversed = oldest_ids;
    reversed.reverse();
    assert_eq!(newest_ids, reversed);
}

#[tokio::test]
async fn purge_author_removes_their_posts_and_comments_everywhere() {
    let harness = Harness::new();
    let leaver = harness.register("Leaving User", "leaver@example.com").await;
    let staying = harness.register("Staying User", "stay@example.com").await;

    let doomed_post = harness.post_as(&leaver, "by leaver").await;
    let kept_post = harness.post_as(&staying, "by stayer").await;
    harness.comment_as(&staying, doomed_post.id(), "on doomed").await;
    harness.comment_as(&leaver, kept_post.id(), "stray comment").await;
    let kept_comment = harness.comment_as(&staying, kept_post.id(), "kept").await;

    harness
        .service
        .purge_author(leaver.id())
        .await
        .expect("purge author");

    // The leaver's post and every comment under it are gone.
    assert!(
        harness
            .posts
            .find_by_id(doomed_post.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        harness
            .comments
            .list_for_post(doomed_post.id())
            .await
            .expect("list")
            .is_empty()
    );

    // Their stray comment elsewhere is gone; other content survives.
    let (_, remaining) = harness
        .service
        .post_with_comments(kept_post.id())
        .await
        .expect("view kept post");
    assert_eq!(remaining, vec![kept_comment]);
}
