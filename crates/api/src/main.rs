use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use futurist_api::background::lockout_sweep;
use futurist_api::config::ServerConfig;
use futurist_api::router::build_app_router;
use futurist_api::security::{InMemoryAttemptStore, LoginAttemptStore};
use futurist_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "futurist_api=debug,futurist_db=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        environment = %config.environment,
        host = %config.host,
        port = %config.port,
        rate_limit = config.rate_limit.enabled,
        "Loaded server configuration"
    );
    if config.dev_fallback_active() {
        tracing::warn!("AUTH_DEV_FALLBACK is enabled: unauthenticated requests act as a demo user");
    }

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = futurist_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    futurist_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    futurist_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Login lockout tracker ---
    let login_attempts: Arc<dyn LoginAttemptStore> =
        Arc::new(InMemoryAttemptStore::new(config.lockout.clone()));

    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(lockout_sweep::run(
        Arc::clone(&login_attempts),
        lockout_sweep::SWEEP_INTERVAL,
        sweep_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        login_attempts,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Lockout sweep stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
