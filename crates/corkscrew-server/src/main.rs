use anyhow::{Context, Result};
use corkscrew_server::config::load_config;
use corkscrew_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Corkscrew server");

    let config_path =
        std::env::var("CORKSCREW_CONFIG").unwrap_or_else(|_| "server-config.yaml".to_string());
    tracing::info!("Loading config from: {}", config_path);
    let config = load_config(&config_path)?;

    match &config.backend {
        Some(backend) => {
            tracing::info!("Using backend at {}", backend.url);
            if !config.verifies_session_tokens() {
                tracing::warn!(
                    "backend.jwt_secret not set, session cookies are trusted without signature checks"
                );
            }
        }
        None => tracing::warn!(
            "BACKEND_URL / BACKEND_ANON_KEY not set, every page will redirect to /setup"
        ),
    }

    let listen = config.listen.clone();
    let app = corkscrew_server::web::build_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind to {}", listen))?;

    tracing::info!("Server listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, stopping...");
}
