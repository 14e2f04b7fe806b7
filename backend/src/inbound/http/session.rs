//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: establishing or tearing down a login,
//! resolving the current caller, and checking session freshness.
//!
//! Freshness models the fresh-vs-remembered distinction on top of a
//! cookie-only store: login stamps a deadline into the session, and sensitive
//! operations (profile edit/delete) require the deadline not to have passed.
//! A remembered session outlives its deadline and must re-authenticate for
//! those operations.

use std::time::Duration;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const FRESH_UNTIL_KEY: &str = "fresh_until";
pub(crate) const REMEMBERED_KEY: &str = "remembered";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn insert(&self, key: &str, value: impl serde::Serialize) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Establish an authenticated session for the user.
    ///
    /// Rotates the session cookie, stamps the freshness deadline, and records
    /// whether the caller asked to be remembered.
    pub fn establish(
        &self,
        user_id: &UserId,
        remember: bool,
        freshness_window: Duration,
    ) -> Result<(), Error> {
        self.0.renew();
        self.insert(USER_ID_KEY, user_id.to_string())?;
        let window = i64::try_from(freshness_window.as_secs()).unwrap_or(0);
        let fresh_until = Utc::now()
            + chrono::Duration::try_seconds(window).unwrap_or_else(chrono::Duration::zero);
        self.insert(FRESH_UNTIL_KEY, fresh_until.to_rfc3339())?;
        self.insert(REMEMBERED_KEY, remember)
    }

    /// Destroy the session entirely.
    pub fn teardown(&self) {
        self.0.purge();
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Whether the session is still within its freshness window.
    ///
    /// A missing or unparseable deadline counts as stale; resumed sessions
    /// from before the freshness stamp existed must re-authenticate.
    pub fn is_fresh(&self) -> Result<bool, Error> {
        let raw = self
            .0
            .get::<String>(FRESH_UNTIL_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = raw else {
            return Ok(false);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(deadline) => Ok(Utc::now() < deadline.with_timezone(&Utc)),
            Err(error) => {
                tracing::warn!("invalid freshness deadline in session cookie: {error}");
                Ok(false)
            }
        }
    }

    /// Require a freshly-authenticated session for a sensitive operation.
    pub fn require_fresh(&self) -> Result<(), Error> {
        if self.is_fresh()? {
            Ok(())
        } else {
            Err(Error::forbidden(
                "please log in again to confirm this change",
            )
            .with_details(serde_json::json!({ "code": "stale_session" })))
        }
    }

    /// Whether the caller asked to be remembered at login.
    pub fn is_remembered(&self) -> Result<bool, Error> {
        self.0
            .get::<bool>(REMEMBERED_KEY)
            .map(|remembered| remembered.unwrap_or(false))
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
