use std::sync::Arc;

use predictchain::api::router::create_router;
use predictchain::config::AppConfig;
use predictchain::wallet::{JsonRpcProvider, WalletProvider};
use predictchain::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        mode = if config.use_mock_data { "mock" } else { "live" },
        mock_latency = config.mock_latency,
        chain_id = %config.chain_id,
        "Starting predictchain"
    );
    if config.missing_gemini_key() {
        tracing::warn!("GEMINI_API_KEY is not set: live predictions will fall back to simulation");
    }

    let metrics_handle = predictchain::metrics::init_metrics()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    // --- Wallet provider (optional) ---
    let mut background = Vec::new();
    let wallet_provider: Option<Arc<dyn WalletProvider>> = match &config.wallet_rpc_url {
        Some(url) => {
            let provider = Arc::new(JsonRpcProvider::new(http.clone(), url.clone()));
            background.push(provider.clone().spawn_poller(config.wallet_poll_interval()));
            Some(provider as Arc<dyn WalletProvider>)
        }
        None => {
            tracing::warn!("WALLET_RPC_URL not set: wallet connect will report no provider");
            None
        }
    };

    let state = AppState::build(config, http, wallet_provider, metrics_handle);

    if let Err(e) = state.wallet.restore_session().await {
        tracing::warn!(error = %e, "Could not restore wallet session");
    }
    if let Some(listener) = state.wallet.clone().spawn_event_listener() {
        background.push(listener);
    }

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for task in background {
        task.abort();
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
