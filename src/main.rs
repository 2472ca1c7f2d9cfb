use std::net::{SocketAddr, TcpListener};

use anyhow::Context;
use board_api::{
    config::Config, init_db, init_registry, init_tracing, make_router, run_app, AppContext,
    ServerInfo,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    if let Err(error) = start().await {
        tracing::error!("{error:#}");
        std::process::exit(1);
    }
}

async fn start() -> board_api::Result<()> {
    let config = Config::from_env()?;
    let registry = init_registry(&config)?;
    let repository = init_db(&config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = TcpListener::bind(addr).with_context(|| format!("Could not bind {addr}"))?;
    tracing::info!("Server started on http://{addr}");

    let context = AppContext {
        repository,
        registry,
        server_info: ServerInfo::new(&config.db_host, &config.db_name),
    };
    run_app(make_router(), context, listener).await
}
