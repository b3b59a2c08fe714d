use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use filevault::{AppState, Config, create_router, storage::init_store};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("filevault=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = init_store(&config).await?;

    let app = create_router(AppState::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
