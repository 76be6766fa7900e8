use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use super::types::{ApiMarketChart, PriceHistory};
use super::PriceFeed;
use crate::models::CryptoCurrency;

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Demo-tier key header. Keys never go into the URL.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CoinGecko returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Parse(String),
}

/// CoinGecko identifier for each supported symbol.
pub fn coingecko_id(crypto: CryptoCurrency) -> &'static str {
    match crypto {
        CryptoCurrency::Btc => "bitcoin",
        CryptoCurrency::Eth => "ethereum",
        CryptoCurrency::Sol => "solana",
        CryptoCurrency::Ada => "cardano",
        CryptoCurrency::Dot => "polkadot",
        CryptoCurrency::Avax => "avalanche-2",
        CryptoCurrency::Matic => "matic-network",
        CryptoCurrency::Link => "chainlink",
        CryptoCurrency::Xrp => "ripple",
        CryptoCurrency::Doge => "dogecoin",
    }
}

/// Pull `body[gecko_id].usd` out of a `/simple/price` response.
pub fn parse_simple_price(body: &Value, gecko_id: &str) -> Result<Decimal, MarketDataError> {
    let usd = body
        .get(gecko_id)
        .and_then(|entry| entry.get("usd"))
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            MarketDataError::Parse(format!("missing numeric usd price for {gecko_id}"))
        })?;

    Decimal::try_from(usd)
        .map(|d| d.normalize())
        .map_err(|e| MarketDataError::Parse(format!("price {usd} for {gecko_id}: {e}")))
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, MarketDataError> {
        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let start = Instant::now();
        let resp = req.send().await?;
        histogram!("provider_request_seconds", "provider" => "coingecko")
            .record(start.elapsed().as_secs_f64());

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(status = %status, url, "CoinGecko returned non-2xx");
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    /// Current USD price for a coin.
    async fn current_price(&self, crypto: CryptoCurrency) -> Result<Decimal, MarketDataError> {
        let gecko_id = coingecko_id(crypto);
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, gecko_id
        );
        tracing::debug!(crypto = %crypto, gecko_id, "Fetching price from CoinGecko");

        let text = self.get_text(&url).await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| MarketDataError::Parse(format!("invalid JSON: {e}")))?;

        let price = parse_simple_price(&body, gecko_id)?;
        tracing::debug!(crypto = %crypto, price = %price, "CoinGecko price received");
        Ok(price)
    }

    /// USD price series over the last `days` days.
    async fn historical_prices(
        &self,
        crypto: CryptoCurrency,
        days: u32,
    ) -> Result<PriceHistory, MarketDataError> {
        let gecko_id = coingecko_id(crypto);
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}",
            self.base_url, gecko_id, days
        );

        let text = self.get_text(&url).await?;
        let chart: ApiMarketChart = serde_json::from_str(&text)
            .map_err(|e| MarketDataError::Parse(format!("invalid market chart: {e}")))?;

        Ok(chart.into())
    }
}
