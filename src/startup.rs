//! Process lifecycle: schema check, CORS policy, server construction.

use std::io;
use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use crate::auth::AuthSettings;
use crate::config::{Config, ALLOWED_ORIGINS};
use crate::db;
use crate::error::AppError;
use crate::routes;

pub const APP_TITLE: &str = "Todo API";
pub const APP_DESCRIPTION: &str = "A full-stack todo application API with authentication";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cross-origin policy for the browser frontend.
///
/// Only the listed origins get CORS headers, and the matching origin is echoed
/// back rather than `*` because credentials are allowed. Requests from other
/// origins are still served, just without CORS headers.
pub fn cors_policy() -> Cors {
    ALLOWED_ORIGINS
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .block_on_origin_mismatch(false)
        .max_age(3600)
}

/// Renders body and query deserialization failures as `AppError::BadRequest`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Builds the HTTP server on an already bound listener.
pub fn build_server(
    listener: TcpListener,
    pool: PgPool,
    auth_settings: AuthSettings,
) -> io::Result<Server> {
    let pool = web::Data::new(pool);
    let auth_settings = web::Data::new(auth_settings);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(auth_settings.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(Logger::default())
            .wrap(cors_policy())
            .configure(routes::config)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Runs the service until the server stops.
///
/// The pool is closed on every exit path once it has been opened, including
/// a failed schema check.
pub async fn run(config: Config) -> io::Result<()> {
    log::info!("{} v{}: {}", APP_TITLE, APP_VERSION, APP_DESCRIPTION);

    let pool = db::connect(&config.database_url).await.map_err(|e| {
        log::error!("failed to connect to database: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let result = serve(&config, pool.clone()).await;
    pool.close().await;
    result
}

async fn serve(config: &Config, pool: PgPool) -> io::Result<()> {
    db::ensure_schema(&pool).await.map_err(|e| {
        log::error!("failed to ensure database schema: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let listener = TcpListener::bind(config.bind_address())?;
    log::info!("listening on {}", config.server_url());

    let auth_settings = AuthSettings {
        jwt_secret: config.jwt_secret.clone(),
        token_ttl_hours: config.token_ttl_hours,
    };
    build_server(listener, pool, auth_settings)?.await
}
