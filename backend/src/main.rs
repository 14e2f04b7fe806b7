//! Backend entry-point: configuration, persistence, and server startup.

use std::sync::Arc;

use actix_web::cookie::SameSite;
use actix_web::web;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::ports::{Mailer, RecordingMailer};
use backend::inbound::http::health::HealthState;
use backend::outbound::email::SmtpMailer;
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{AppConfig, ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a short-lived synchronous connection.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}

fn build_mailer(config: &AppConfig) -> std::io::Result<Arc<dyn Mailer>> {
    match &config.smtp {
        Some(settings) => SmtpMailer::new(settings.clone())
            .map(|mailer| Arc::new(mailer) as Arc<dyn Mailer>)
            .map_err(|err| std::io::Error::other(err.to_string())),
        None => {
            warn!("SMTP_HOST not set; outbound mail will be logged, not delivered");
            Ok(Arc::new(RecordingMailer::new()))
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let key = config.load_session_key()?;
    let mailer = build_mailer(&config)?;
    let token_issuer = Arc::new(config.token_issuer());

    let mut server_config = ServerConfig::new(
        key,
        config.cookie_secure,
        SameSite::Lax,
        config.bind_addr,
    )
    .with_session_ttl(config.session_ttl)
    .with_freshness_window(config.freshness_window)
    .with_mailer(mailer)
    .with_token_issuer(token_issuer)
    .with_account_policy(config.account_policy());

    match &config.database_url {
        Some(database_url) => {
            run_migrations(database_url)?;
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            server_config = server_config.with_db_pool(pool);
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores (data dies with the process)");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr, "starting forum backend");
    create_server(health_state, server_config)?.await
}
