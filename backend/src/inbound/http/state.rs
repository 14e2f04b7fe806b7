//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain services and remain testable without I/O: tests build
//! the same state over in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AccountService, ForumService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, login, profile, confirmation, and reset use-cases.
    pub accounts: Arc<AccountService>,
    /// Post/comment lifecycle and feed use-cases.
    pub forum: Arc<ForumService>,
    /// How long after login a session counts as freshly authenticated.
    pub freshness_window: Duration,
}

impl HttpState {
    /// Bundle the services handlers depend on.
    pub fn new(
        accounts: Arc<AccountService>,
        forum: Arc<ForumService>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            accounts,
            forum,
            freshness_window,
        }
    }
}
