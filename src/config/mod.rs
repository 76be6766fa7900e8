use std::env;
use std::time::Duration;

use crate::providers::coingecko_client::COINGECKO_API_BASE;
use crate::providers::gemini_client::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE};

/// Ethereum mainnet.
const DEFAULT_CHAIN_ID: &str = "0x1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Mock/live switch
    pub use_mock_data: bool,
    pub mock_latency: bool,

    // Providers (keys optional; the free tiers work without them)
    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub http_timeout_secs: u64,

    // Wallet
    pub chain_id: String,
    pub wallet_rpc_url: Option<String>,
    pub wallet_poll_interval_secs: u64,

    pub query_stale_secs: u64,
    pub api_token: Option<String>,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn number(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            use_mock_data: flag("USE_MOCK_DATA", true),
            mock_latency: flag("MOCK_LATENCY", true),

            coingecko_api_url: non_empty("COINGECKO_API_URL")
                .unwrap_or_else(|| COINGECKO_API_BASE.into()),
            coingecko_api_key: non_empty("COINGECKO_API_KEY"),
            gemini_api_url: non_empty("GEMINI_API_URL").unwrap_or_else(|| GEMINI_API_BASE.into()),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            http_timeout_secs: number("HTTP_TIMEOUT_SECS", 15).max(1),

            chain_id: non_empty("CHAIN_ID").unwrap_or_else(|| DEFAULT_CHAIN_ID.into()),
            wallet_rpc_url: non_empty("WALLET_RPC_URL"),
            wallet_poll_interval_secs: number("WALLET_POLL_INTERVAL_SECS", 5).max(1),

            query_stale_secs: number("QUERY_STALE_SECS", 30),
            api_token: non_empty("API_TOKEN"),
        })
    }

    /// Settings for tests and embedding: mock mode, no latency, no wallet.
    pub fn for_mock() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            use_mock_data: true,
            mock_latency: false,
            coingecko_api_url: COINGECKO_API_BASE.into(),
            coingecko_api_key: None,
            gemini_api_url: GEMINI_API_BASE.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_api_key: None,
            http_timeout_secs: 15,
            chain_id: DEFAULT_CHAIN_ID.into(),
            wallet_rpc_url: None,
            wallet_poll_interval_secs: 5,
            query_stale_secs: 30,
            api_token: None,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn query_stale_time(&self) -> Duration {
        Duration::from_secs(self.query_stale_secs)
    }

    pub fn wallet_poll_interval(&self) -> Duration {
        Duration::from_secs(self.wallet_poll_interval_secs)
    }

    /// True when live mode is on but the generative provider has no key.
    pub fn missing_gemini_key(&self) -> bool {
        !self.use_mock_data && self.gemini_api_key.is_none()
    }
}
