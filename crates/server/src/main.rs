use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidfetch_core::{
    load_config, validate_config, DownloadOrchestrator, Retriever, SupabaseTaskStore, TaskStore,
    YtDlpRetriever,
};
use vidfetch_server::{api::create_router, state::AppState, SERVICE_NAME, VERSION};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} v{}", SERVICE_NAME, VERSION);

    // Determine config path. Only an explicitly named file must exist.
    let config_path = match std::env::var("VIDFETCH_CONFIG") {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let default_path = PathBuf::from("config.toml");
            default_path.exists().then_some(default_path)
        }
    };

    // Load configuration
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file, using defaults and environment"),
    }
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Create task store. Without one the service still serves downloads.
    let store: Option<Arc<dyn TaskStore>> = match SupabaseTaskStore::new(&config.store) {
        Ok(store) => {
            info!(
                "Task store initialized at {} (table: {})",
                config.store.url, config.store.table
            );
            Some(Arc::new(store) as Arc<dyn TaskStore>)
        }
        Err(e) => {
            warn!("Task store unavailable, status updates disabled: {}", e);
            None
        }
    };

    // Create retriever
    let retriever = Arc::new(YtDlpRetriever::new(config.retriever.clone()));
    match retriever.validate().await {
        Ok(()) => info!(
            "Retriever ready: {} (output dir: {:?})",
            retriever.name(),
            config.retriever.output_dir
        ),
        Err(e) => warn!("Retriever validation failed, downloads will fail: {}", e),
    }

    // Create orchestrator
    let orchestrator = Arc::new(DownloadOrchestrator::new(
        config.orchestrator.clone(),
        store,
        retriever,
    ));
    info!(
        "Orchestrator ready (retrieval timeout: {}s, duplicates: {:?})",
        config.orchestrator.retrieval_timeout_secs, config.orchestrator.duplicate_policy
    );

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), orchestrator));

    // Create router
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Let accepted downloads reach a terminal state before exiting.
    let tasks = state.tasks();
    tasks.close();
    if !tasks.is_empty() {
        info!("Waiting for {} download(s) to finish", tasks.len());
    }
    tasks.wait().await;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
