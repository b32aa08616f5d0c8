use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webs_api::background::run_eviction;
use webs_api::config::ServerConfig;
use webs_api::engine::run_registry::RunRegistry;
use webs_api::router::build_app_router;
use webs_api::state::AppState;
use webs_db::store::PgWebStore;
use webs_events::{EventBus, KnockConfig, KnockNotifier, LogNotifier, Notifier};
use webs_mastra::MastraApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "webs_api=debug,tower_http=debug".into());
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
        host = %config.host,
        port = %config.port,
        mastra_url = %config.mastra.base_url,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = webs_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    webs_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    webs_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notifications ---
    let notifier: Arc<dyn Notifier> = match KnockConfig::from_env() {
        Some(knock) => {
            tracing::info!("Delivering notifications through Knock");
            Arc::new(KnockNotifier::new(knock).expect("Failed to build Knock client"))
        }
        None => {
            tracing::warn!("KNOCK_API_KEY is not set; notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // --- Workflow engine ---
    let workflows = Arc::new(MastraApi::new(
        config.mastra.base_url.clone(),
        config.mastra.timeout,
    ));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- Run registry + eviction ---
    let runs = Arc::new(RunRegistry::new(Duration::from_secs(
        config.run_registry_ttl_secs,
    )));
    let eviction_cancel = tokio_util::sync::CancellationToken::new();
    let eviction_handle = tokio::spawn(run_eviction::run(
        Arc::clone(&runs),
        run_eviction::EVICTION_INTERVAL,
        eviction_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        store: Arc::new(PgWebStore::new(pool.clone())),
        pool,
        config: Arc::new(config.clone()),
        workflows,
        notifier,
        event_bus: Arc::clone(&event_bus),
        runs,
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

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    eviction_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), eviction_handle).await;
    tracing::info!("Run eviction stopped");

    // Closing the bus ends any relay still subscribed.
    drop(event_bus);

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
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
