//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ConfigError, ServerConfig};

use std::sync::Arc;
use std::time::Duration;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    CommentRepository, InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository,
    PostRepository, UserRepository,
};
use crate::domain::{AccountService, ForumService};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::posts::{
    add_comment, create_post, delete_post, edit_post, list_posts, mark_solution, view_post,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    complete_password_reset, confirm_email, delete_profile, login, logout, profile,
    request_password_reset, resend_confirmation, signup, update_profile,
};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DieselCommentRepository, DieselPostRepository, DieselUserRepository,
};

/// Everything `build_app` needs to assemble one application instance.
#[derive(Clone)]
pub struct AppDependencies {
    /// Shared readiness/liveness state.
    pub health_state: web::Data<HealthState>,
    /// Service bundle for the HTTP handlers.
    pub http_state: web::Data<HttpState>,
    /// Session cookie signing/encryption key.
    pub key: Key,
    /// Set the `Secure` flag on the session cookie.
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie.
    pub same_site: SameSite,
    /// Session cookie lifetime.
    pub session_ttl: Duration,
}

/// Choose persistence adapters and assemble the domain services.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (users, posts, comments): (
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
        Arc<dyn CommentRepository>,
    ) = match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselPostRepository::new(pool.clone())),
            Arc::new(DieselCommentRepository::new(pool.clone())),
        ),
        None => (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryCommentRepository::new()),
        ),
    };

    let forum = ForumService::new(users.clone(), posts, comments);
    let accounts = AccountService::new(
        users,
        forum.clone(),
        config.credential_hasher.clone(),
        config.mailer.clone(),
        config.token_issuer.clone(),
        config.account_policy.clone(),
    );

    web::Data::new(HttpState::new(
        Arc::new(accounts),
        Arc::new(forum),
        config.freshness_window,
    ))
}

fn session_ttl_cookie(ttl: Duration) -> actix_web::cookie::time::Duration {
    actix_web::cookie::time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

/// Assemble one application instance from prepared dependencies.
///
/// Exposed so integration tests drive exactly the wiring production uses.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        session_ttl,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(session_ttl_cookie(session_ttl)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(signup)
        .service(login)
        .service(logout)
        .service(profile)
        .service(update_profile)
        .service(delete_profile)
        .service(confirm_email)
        .service(resend_confirmation)
        .service(request_password_reset)
        .service(complete_password_reset)
        .service(list_posts)
        .service(create_post)
        .service(view_post)
        .service(edit_post)
        .service(delete_post)
        .service(add_comment)
        .service(mark_solution);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing session, binding, and adapter settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        session_ttl,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            session_ttl,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
