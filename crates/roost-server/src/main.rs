use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use roost_api::{AppState, AppStateInner, GateConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let secret_key =
        std::env::var("ROOST_SECRET_KEY").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("ROOST_DB_PATH").unwrap_or_else(|_| "roost.db".into());
    let host = std::env::var("ROOST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ROOST_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;
    let gate = GateConfig {
        username: std::env::var("ROOST_GATE_USER").unwrap_or_else(|_| "roost".into()),
        password: std::env::var("ROOST_GATE_PASSWORD").unwrap_or_else(|_| "not-open-yet".into()),
    };

    // Init database
    let db = roost_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state + routes
    let state: AppState = Arc::new(AppStateInner { db, secret_key, gate });
    let app = roost_api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Roost listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
