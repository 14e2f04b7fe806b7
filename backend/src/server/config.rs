//! Application configuration and the HTTP server configuration object.
//!
//! Configuration is an explicit value assembled once at startup and passed
//! into server construction; nothing reads the environment after boot.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;

use crate::domain::AccountPolicy;
use crate::domain::ports::{CredentialHasher, Mailer, RecordingMailer, TokenIssuer};
use crate::outbound::email::SmtpSettings;
use crate::outbound::persistence::DbPool;
use crate::outbound::security::Argon2CredentialHasher;
use crate::outbound::tokens::HmacTokenIssuer;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was present but unparseable.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_owned(),
            message: message.into(),
        }
    }
}

/// Application settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: String,
    /// Allow an ephemeral session key outside debug builds.
    pub session_allow_ephemeral: bool,
    /// Set the `Secure` flag on the session cookie.
    pub cookie_secure: bool,
    /// Session cookie lifetime.
    pub session_ttl: Duration,
    /// How long after login a session counts as freshly authenticated.
    pub freshness_window: Duration,
    /// Base URL used in emailed links (no trailing slash).
    pub public_base_url: String,
    /// Secret for signing confirmation/reset tokens; ephemeral when absent.
    pub token_secret: Option<String>,
    /// Confirmation link lifetime.
    pub confirmation_max_age: Duration,
    /// Password-reset link lifetime.
    pub reset_max_age: Duration,
    /// SMTP settings; messages are logged instead of sent when absent.
    pub smtp: Option<SmtpSettings>,
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|err| ConfigError::invalid(key, err.to_string())),
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup, for tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup("BIND_ADDR") {
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::invalid("BIND_ADDR", "expected host:port"))?,
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_owned())
            .trim_end_matches('/')
            .to_owned();

        let smtp = match lookup("SMTP_HOST") {
            None => None,
            Some(host) => {
                let port = match lookup("SMTP_PORT") {
                    None => 587,
                    Some(raw) => raw
                        .parse::<u16>()
                        .map_err(|err| ConfigError::invalid("SMTP_PORT", err.to_string()))?,
                };
                Some(SmtpSettings {
                    host,
                    port,
                    username: lookup("SMTP_USERNAME"),
                    password: lookup("SMTP_PASSWORD"),
                    use_tls: lookup("SMTP_TLS").as_deref() != Some("0"),
                    from_address: lookup("MAIL_FROM")
                        .unwrap_or_else(|| "no-reply@localhost".to_owned()),
                    from_name: lookup("MAIL_FROM_NAME"),
                })
            }
        };

        Ok(Self {
            bind_addr,
            database_url: lookup("DATABASE_URL"),
            session_key_file: lookup("SESSION_KEY_FILE")
                .unwrap_or_else(|| "/var/run/secrets/session_key".to_owned()),
            session_allow_ephemeral: lookup("SESSION_ALLOW_EPHEMERAL").as_deref() == Some("1"),
            cookie_secure: lookup("SESSION_COOKIE_SECURE").as_deref() != Some("0"),
            session_ttl: parse_secs(&lookup, "SESSION_TTL_SECS", 7200)?,
            freshness_window: parse_secs(&lookup, "SESSION_FRESHNESS_SECS", 1800)?,
            public_base_url,
            token_secret: lookup("TOKEN_SECRET"),
            confirmation_max_age: parse_secs(&lookup, "CONFIRMATION_TOKEN_TTL_SECS", 86_400)?,
            reset_max_age: parse_secs(&lookup, "PASSWORD_RESET_TOKEN_TTL_SECS", 3600)?,
            smtp,
        })
    }

    /// Account policy derived from these settings.
    pub fn account_policy(&self) -> AccountPolicy {
        AccountPolicy {
            public_base_url: self.public_base_url.clone(),
            confirmation_max_age: self.confirmation_max_age,
            reset_max_age: self.reset_max_age,
        }
    }

    /// Load the session key from the configured file.
    ///
    /// Outside debug builds a missing key file is fatal unless ephemeral
    /// keys were explicitly allowed; every restart would otherwise log all
    /// users out silently.
    pub fn load_session_key(&self) -> std::io::Result<Key> {
        match std::fs::read(&self.session_key_file) {
            Ok(bytes) => Ok(Key::derive_from(&bytes)),
            Err(err) => {
                if cfg!(debug_assertions) || self.session_allow_ephemeral {
                    warn!(
                        path = %self.session_key_file,
                        error = %err,
                        "using temporary session key (dev only)"
                    );
                    Ok(Key::generate())
                } else {
                    Err(std::io::Error::other(format!(
                        "failed to read session key at {}: {err}",
                        self.session_key_file
                    )))
                }
            }
        }
    }

    /// Token issuer derived from these settings.
    ///
    /// Without a configured secret the issuer key is process-local, so
    /// outstanding confirmation/reset links die with the process.
    pub fn token_issuer(&self) -> HmacTokenIssuer {
        match &self.token_secret {
            Some(secret) => HmacTokenIssuer::new(secret.as_bytes()),
            None => {
                warn!("TOKEN_SECRET not set; emailed links will not survive a restart");
                HmacTokenIssuer::with_random_key()
            }
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session_ttl: Duration,
    pub(crate) freshness_window: Duration,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) mailer: Arc<dyn Mailer>,
    pub(crate) credential_hasher: Arc<dyn CredentialHasher>,
    pub(crate) token_issuer: Arc<dyn TokenIssuer>,
    pub(crate) account_policy: AccountPolicy,
}

impl ServerConfig {
    /// Construct a server configuration with development-safe defaults:
    /// in-memory stores, a logging mailer, Argon2 hashing, and an ephemeral
    /// token key.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            session_ttl: Duration::from_secs(7200),
            freshness_window: Duration::from_secs(1800),
            db_pool: None,
            mailer: Arc::new(RecordingMailer::new()),
            credential_hasher: Arc::new(Argon2CredentialHasher::new()),
            token_issuer: Arc::new(HmacTokenIssuer::with_random_key()),
            account_policy: AccountPolicy::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the mailer adapter.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Replace the credential hasher adapter.
    #[must_use]
    pub fn with_credential_hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.credential_hasher = hasher;
        self
    }

    /// Replace the token issuer adapter.
    #[must_use]
    pub fn with_token_issuer(mut self, issuer: Arc<dyn TokenIssuer>) -> Self {
        self.token_issuer = issuer;
        self
    }

    /// Set the session cookie lifetime.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the session freshness window.
    #[must_use]
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Set the account policy (link base URL and token lifetimes).
    #[must_use]
    pub fn with_account_policy(mut self, policy: AccountPolicy) -> Self {
        self.account_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|value| (*value).to_owned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let map = HashMap::new();
        let config = AppConfig::from_lookup(lookup_from(&map)).expect("defaults parse");

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.database_url.is_none());
        assert!(config.cookie_secure);
        assert_eq!(config.session_ttl, Duration::from_secs(7200));
        assert_eq!(config.freshness_window, Duration::from_secs(1800));
        assert_eq!(config.public_base_url, "http://localhost:8080");
        assert!(config.smtp.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let map = HashMap::from([
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/forum"),
            ("SESSION_COOKIE_SECURE", "0"),
            ("SESSION_FRESHNESS_SECS", "60"),
            ("PUBLIC_BASE_URL", "https://forum.example.com/"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "465"),
            ("MAIL_FROM", "forum@example.com"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&map)).expect("values parse");

        assert_eq!(config.bind_addr.port(), 9000);
        assert!(!config.cookie_secure);
        assert_eq!(config.freshness_window, Duration::from_secs(60));
        // Trailing slash is trimmed so link formatting can append paths.
        assert_eq!(config.public_base_url, "https://forum.example.com");
        let smtp = config.smtp.expect("smtp configured");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.from_address, "forum@example.com");
    }

    #[test]
    fn unparseable_values_are_rejected() {
        let map = HashMap::from([("SESSION_TTL_SECS", "soon")]);
        let err = AppConfig::from_lookup(lookup_from(&map)).expect_err("bad value must fail");
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "SESSION_TTL_SECS"));
    }

    #[test]
    fn server_config_builder_round_trips() {
        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            SocketAddr::from(([127, 0, 0, 1], 0)),
        )
        .with_session_ttl(Duration::from_secs(60))
        .with_freshness_window(Duration::from_secs(10));

        assert_eq!(config.bind_addr().port(), 0);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.freshness_window, Duration::from_secs(10));
        assert!(config.db_pool.is_none());
    }
}
