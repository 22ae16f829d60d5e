use std::process::ExitCode;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use claims_server::{create_router, AppState};

const DEFAULT_LOG_FILTER: &str =
    "claims_server=info,claims_extraction=info,claims_core=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = claims_core::AppConfig::from_env();
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!(
        endpoint = %config.extraction.endpoint,
        deployment = %config.extraction.deployment,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config);

    let app = create_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Claims processing API listening on {addr}");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
