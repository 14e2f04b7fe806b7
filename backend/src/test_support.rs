//! Shared builders for handler and integration tests.
//!
//! Gated behind the `test-support` feature so integration tests exercise the
//! same wiring as production, with in-memory stores, a recording mailer, and
//! a deterministic token key.

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;

use crate::domain::ports::{
    FixtureCredentialHasher, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryUserRepository, RecordingMailer,
};
use crate::domain::{AccountPolicy, AccountService, ForumService};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::tokens::HmacTokenIssuer;
use crate::server::AppDependencies;

/// Secret used for signing tokens in tests; redeeming is deterministic.
pub const TEST_TOKEN_SECRET: &[u8] = b"test-token-secret";

/// Services plus the backing fixtures tests assert against.
pub struct TestBackend {
    /// Handler state bundle.
    pub state: web::Data<HttpState>,
    /// Captured outbound mail.
    pub mailer: Arc<RecordingMailer>,
    /// Identity store contents.
    pub users: Arc<InMemoryUserRepository>,
    /// Post store contents.
    pub posts: Arc<InMemoryPostRepository>,
    /// Comment store contents.
    pub comments: Arc<InMemoryCommentRepository>,
    /// Token issuer sharing [`TEST_TOKEN_SECRET`].
    pub tokens: Arc<HmacTokenIssuer>,
}

impl TestBackend {
    /// Dependencies for [`crate::server::build_app`] with a fresh session key
    /// and test-friendly cookie settings.
    pub fn app_dependencies(&self) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: self.state.clone(),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            session_ttl: Duration::from_secs(7200),
        }
    }
}

/// Build a backend over in-memory stores with a 30 minute freshness window.
pub fn test_backend() -> TestBackend {
    test_backend_with_freshness(Duration::from_secs(1800))
}

/// Build a backend over in-memory stores with the given freshness window.
pub fn test_backend_with_freshness(freshness_window: Duration) -> TestBackend {
    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new());
    let comments = Arc::new(InMemoryCommentRepository::new());
    let mailer = Arc::new(RecordingMailer::new());
    let tokens = Arc::new(HmacTokenIssuer::new(TEST_TOKEN_SECRET));

    let forum = ForumService::new(users.clone(), posts.clone(), comments.clone());
    let accounts = AccountService::new(
        users.clone(),
        forum.clone(),
        Arc::new(FixtureCredentialHasher),
        mailer.clone(),
        tokens.clone(),
        AccountPolicy::default(),
    );

    let state = web::Data::new(HttpState::new(
        Arc::new(accounts),
        Arc::new(forum),
        freshness_window,
    ));

    TestBackend {
        state,
        mailer,
        users,
        posts,
        comments,
        tokens,
    }
}

/// Pull the `token=` value out of a recorded mail body.
pub fn token_from_mail_body(body: &str) -> Option<String> {
    let start = body.find("token=")? + "token=".len();
    let rest = body.get(start..)?;
    let end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    rest.get(..end).map(str::to_owned)
}
