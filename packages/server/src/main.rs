use std::net::{IpAddr, SocketAddr};

use tracing::{Level, info};

use server::config::AppConfig;
use server::state::AppState;
use server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;
    seed::seed_admin_user(&db, &config).await?;

    tokio::fs::create_dir_all(&config.storage.path).await?;

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = AppState {
        db: db.clone(),
        config,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    info!("Database connection closed");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
    info!("Shutdown signal received, draining");
}
