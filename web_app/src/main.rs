//! # Portfolio Site Server
//!
//! Serves the single page portfolio, its Admin console API and the
//! analytics counters behind both. Configures SSL, logging and routes.

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod repo;
pub mod services;
pub mod utils;

use anyhow::Context;
use logfire::config::MetricsOptions;
use ntex::web;
use ntex_cors::Cors;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use std::sync::Arc;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    config::init_config().await?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    // Initialize logging and metrics; Logfire only when a token is configured
    let shutdown_handler = match app_config.logfire_token.as_deref() {
        Some(token) if app_config.metrics_sink_enabled() => Some(
            logfire::configure()
                .install_panic_handler()
                .with_metrics(Some(MetricsOptions::default()))
                .send_to_logfire(logfire::config::SendToLogfire::Yes)
                .with_token(token)
                .finish()?,
        ),
        _ => {
            logger::setup_simple_logger()?;
            None
        }
    };

    // Initialize database connection pool
    let sqlite_repo =
        repo::sqlite::SqlxSqliteRepo::new(utils::setup_sqlite_db_pool(app_config.is_prod()).await?);
    sqlite_repo.ensure_schema().await?;
    let site_repo: repo::ImplSiteRepo = Arc::new(sqlite_repo);

    let metrics_sink: Option<services::ImplMetricsSink> = if app_config.metrics_sink_enabled() {
        Some(Arc::new(services::metrics_sink::LogfireSink))
    } else {
        None
    };

    let recorder =
        api::recorder::EventRecorder::new(site_repo.clone(), metrics_sink, app_config.environment());
    log::info!(
        "recording analytics for {} at {}",
        recorder.environment(),
        app_config.base_url()
    );

    // Configure and start the web server
    configure_and_run_server(site_repo, recorder).await?;

    if let Some(shutdown_handler) = shutdown_handler {
        shutdown_handler.shutdown()?;
    }

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor() -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;
    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    site_repo: repo::ImplSiteRepo,
    recorder: api::recorder::EventRecorder,
) -> anyhow::Result<()> {
    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;
    let server_addr = ("0.0.0.0", app_config.web_server_port);

    let server = web::server(move || {
        web::App::new()
            .wrap(
                Cors::new()
                    .allowed_methods(vec!["GET", "HEAD", "POST", "OPTIONS", "PUT", "DELETE"])
                    .allowed_origin(&app_config.allowed_origin)
                    .allowed_header(consts::ADMIN_PIN_HEADER)
                    .finish(),
            )
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(front::AppState {
                repo: site_repo.clone(),
                recorder: recorder.clone(),
                admin_pin: app_config.admin_pin.clone(),
                static_dir: app_config.static_dir.clone(),
            })
            .configure(front::routes::analytics)
            .configure(front::routes::content)
            .configure(front::routes::admin)
            .service((
                ntex_files::Files::new("/static", &app_config.static_dir),
                front::server::serve_favicon,
                front::server::index,
            ))
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor()?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
