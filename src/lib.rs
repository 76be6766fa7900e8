pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod queries;
pub mod services;
pub mod wallet;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::catalog::{nft_catalog, seed_predictions};
use crate::config::AppConfig;
use crate::db::{InMemoryPredictionRepo, NftPredictionStore};
use crate::providers::{CoinGeckoClient, GeminiClient, PriceFeed};
use crate::queries::{ContractQueries, NftQueries, PredictionQueries, QueryCache};
use crate::services::contract_service::ContractService;
use crate::services::nft_service::NftService;
use crate::services::notifier::Notifier;
use crate::services::prediction_service::{PredictionService, ServiceMode};
use crate::services::simulator::LatencyProfile;
use crate::wallet::{WalletConnector, WalletProvider};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub mode: ServiceMode,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub notifier: Notifier,
    pub predictions: Arc<PredictionQueries>,
    pub nfts: Arc<NftQueries>,
    pub contracts: Arc<ContractQueries>,
    pub wallet: Arc<WalletConnector>,
    pub price_feed: Arc<dyn PriceFeed>,
}

impl AppState {
    /// Wire services, caches and clients from configuration.
    pub fn build(
        config: AppConfig,
        http: reqwest::Client,
        wallet_provider: Option<Arc<dyn WalletProvider>>,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let (ws_tx, _) = broadcast::channel::<WsMessage>(256);
        let notifier = Notifier::new(ws_tx);

        let mode = ServiceMode::from_mock_flag(config.use_mock_data);
        let latency = if config.mock_latency {
            LatencyProfile::default()
        } else {
            LatencyProfile::none()
        };

        let coingecko = Arc::new(CoinGeckoClient::new(
            http.clone(),
            config.coingecko_api_url.clone(),
            config.coingecko_api_key.clone(),
        ));
        let gemini = Arc::new(GeminiClient::new(
            http,
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
        ));

        let cache = Arc::new(QueryCache::new(config.query_stale_time()));

        let prediction_service = PredictionService::new(
            mode,
            Arc::new(InMemoryPredictionRepo::with_seed(seed_predictions())),
            latency,
        )
        .with_price_feed(coingecko.clone())
        .with_predictor(gemini.clone());

        let nft_service = NftService::new(mode, nft_catalog(), NftPredictionStore::new(), latency)
            .with_predictor(gemini);

        let wallet = Arc::new(WalletConnector::new(
            wallet_provider,
            config.chain_id.clone(),
            notifier.clone(),
        ));

        Self {
            mode,
            predictions: Arc::new(PredictionQueries::new(
                Arc::new(prediction_service),
                cache.clone(),
                notifier.clone(),
            )),
            nfts: Arc::new(NftQueries::new(Arc::new(nft_service), cache, notifier.clone())),
            contracts: Arc::new(ContractQueries::new(
                Arc::new(ContractService::new(latency)),
                wallet.clone(),
                notifier.clone(),
            )),
            wallet,
            price_feed: coingecko,
            notifier,
            metrics_handle,
            config,
        }
    }
}
