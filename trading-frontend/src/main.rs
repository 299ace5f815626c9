use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use trading_frontend::config::get_configuration;
use trading_frontend::services::identity_client::IdentityClient;
use trading_frontend::services::profile_store::ProfileStore;
use trading_frontend::startup::build_router;
use trading_frontend::AppState;
use web_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    // Initialize tracing using shared logic
    init_tracing(
        "trading-frontend",
        &configuration.observability.log_level,
        configuration.observability.otlp_endpoint.as_deref(),
    );

    trading_frontend::services::metrics::init_metrics();

    let identity = Arc::new(IdentityClient::new(configuration.identity_service.clone()));
    let profiles = Arc::new(ProfileStore::new(configuration.profile_store.clone()));
    let state = AppState::new(identity, profiles, configuration.site.clone());

    let app = build_router(state);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting trading-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
