use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use muster_api::bootstrap::{seed_if_empty, BootstrapConfig};
use muster_api::config::ServerConfig;
use muster_api::router::build_app_router;
use muster_api::state::AppState;
use muster_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "muster_api=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let pool = prepare_database().await;

    let app = build_app_router(AppState::new(pool.clone(), config.clone()), &config);
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Muster API listening");

    // After a signal, in-flight requests get `shutdown_timeout_secs` to finish.
    let signalled = Arc::new(Notify::new());
    let notify = Arc::clone(&signalled);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        notify.notify_one();
    });
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    tokio::select! {
        result = server.into_future() => result.expect("Server error"),
        () = async {
            signalled.notified().await;
            tokio::time::sleep(drain).await;
        } => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "In-flight requests did not drain in time"
            );
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, migrate and (on a brand-new database) seed the first
/// organisation. Any failure aborts startup.
async fn prepare_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = muster_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    muster_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    muster_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    match BootstrapConfig::from_env() {
        Some(bootstrap) => {
            let seeded = seed_if_empty(&pool, &bootstrap)
                .await
                .expect("Failed to seed empty database");
            if !seeded {
                tracing::debug!("Database already has an organisation; seed skipped");
            }
        }
        None => tracing::debug!("ADMIN_USERNAME/ADMIN_PASSWORD not set; seed skipped"),
    }
    pool
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
