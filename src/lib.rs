pub mod boards;
pub mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
pub mod models;
mod pages;

use std::{future::Future, net::TcpListener, sync::Arc, time::Duration};

use anyhow::Context;
pub use anyhow::Result;
use axum::http::{
    header::{
        ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        X_XSS_PROTECTION,
    },
    HeaderValue, Method, StatusCode,
};
use axum::{routing::*, Extension, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use boards::BoardRegistry;
use config::Config;
pub use data_formats::*;
pub use db_helpers::BoardRepository;
pub use errors::{RequestError, RequestErrorJson};
use handlers::*;
use pages::{board_list_page, post_view_page};

pub type JsonResponse<T> = (StatusCode, Json<T>);

const DEFAULT_LOG_FILTER: &str = "board_api=info,tower_http=info";

/// Fixed facts reported by the status route.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub start_time: String,
    pub db_host: String,
    pub db_name: String,
}

impl ServerInfo {
    pub fn new(db_host: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            start_time: chrono::Local::now()
                .format(models::DATETIME_FORMAT)
                .to_string(),
            db_host: db_host.into(),
            db_name: db_name.into(),
        }
    }
}

/// Everything a handler needs, shared through an `Extension`.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub repository: BoardRepository,
    pub registry: BoardRegistry,
    pub server_info: ServerInfo,
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run_app(app: Router, context: AppContext, listener: TcpListener) -> Result<()> {
    run_app_with_shutdown(app, context, listener, shutdown_signal()).await
}

pub async fn run_app_with_shutdown<F>(
    app: Router,
    context: AppContext,
    listener: TcpListener,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let app = apply_middleware(app.layer(Extension(Arc::new(context))));
    axum::Server::from_tcp(listener)
        .context("Failed to use the listener")?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;
    tracing::info!("Server stopped");
    Ok(())
}

pub async fn init_db(config: &Config) -> Result<BoardRepository> {
    let repository = BoardRepository::connect(&config.database_url).await?;
    repository
        .ping()
        .await
        .context("Database did not answer the startup ping")?;
    tracing::info!(host = %config.db_host, name = %config.db_name, "Connected to database");
    Ok(repository)
}

pub fn init_registry(config: &Config) -> Result<BoardRegistry> {
    match &config.board_allow_list {
        Some(keys) => BoardRegistry::with_allow_list(keys),
        None => Ok(BoardRegistry::default()),
    }
}

pub fn apply_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    router
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub fn make_router() -> Router {
    Router::new()
        .route("/", get(server_status))
        .route("/api/:board", get(list_posts))
        .route("/api/:board/:id", get(get_post))
        .route("/api/:board/:id/comments", get(list_comments))
        .route("/:board", get(board_list_page))
        .route("/:board/:id", get(post_view_page))
        .fallback(not_found)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
