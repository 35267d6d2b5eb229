use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use outreach_api::promo;
use outreach_api::state::AppStateInner;
use outreach_queue::{Job, LocalQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outreach=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("OUTREACH_DB_PATH").unwrap_or_else(|_| "outreach.db".into());
    let host = std::env::var("OUTREACH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("OUTREACH_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = outreach_db::Database::open(&PathBuf::from(&db_path))?;

    // Delivery queue — the worker end drains jobs toward the message
    // transport, which lives outside this service.
    let (queue, rx) = LocalQueue::new();
    tokio::spawn(run_delivery_worker(rx));

    let state = Arc::new(AppStateInner {
        db,
        queue: Arc::new(queue),
    });

    // Routes
    let app = Router::new()
        .route("/promo_messages", get(promo::index).post(promo::create))
        .route("/promo_messages/new", get(promo::new_form))
        .route("/promo_messages/download_csv", get(promo::download_csv))
        .route("/health", get(promo::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Outreach server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Hand each delivery job to the message transport. No completion or
/// failure signal flows back into the request path.
async fn run_delivery_worker(mut rx: tokio::sync::mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        info!("Delivery task '{}' handed off for {}", job.task, job.phone);
    }
    info!("Delivery worker stopped: queue closed");
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
