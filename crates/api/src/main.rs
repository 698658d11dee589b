use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use remat_classifier::InferenceClient;
use remat_core::deposit::DepositEngine;
use remat_core::waste::PointsTable;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remat_api::config::ServerConfig;
use remat_api::router::build_app_router;
use remat_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "remat_api=debug,remat_db=debug,remat_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = remat_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    remat_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    remat_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Points table ---
    let points = match &config.points_table_path {
        Some(path) => {
            let table = PointsTable::load(path)
                .unwrap_or_else(|e| panic!("Failed to load points table: {e}"));
            tracing::info!(path = %path.display(), "Loaded points table");
            table
        }
        None => PointsTable::reference(),
    };

    let engine = DepositEngine::new(Arc::new(points), config.fill_increment)
        .expect("DEPOSIT_FILL_INCREMENT must be positive");

    // --- Classifier ---
    let classifier = InferenceClient::new(
        &config.classifier_url,
        &config.classifier_model,
        Duration::from_secs(config.classifier_timeout_secs),
    )
    .expect("Failed to build classifier HTTP client");
    tracing::info!(
        url = %config.classifier_url,
        model = %config.classifier_model,
        "Classifier client created"
    );

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(pool, config, Arc::new(classifier), engine);

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
