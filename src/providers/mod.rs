pub mod coingecko_client;
pub mod gemini_client;
pub mod types;

pub use coingecko_client::{CoinGeckoClient, MarketDataError};
pub use gemini_client::{GeminiClient, GeminiError};
pub use types::{FloorPricePrediction, PriceHistory, PricePoint, PricePrediction};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{CryptoCurrency, Nft, TimeFrame};

/// Market-data capability used by the live prediction path.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn current_price(&self, crypto: CryptoCurrency) -> Result<Decimal, MarketDataError>;

    async fn historical_prices(
        &self,
        crypto: CryptoCurrency,
        days: u32,
    ) -> Result<PriceHistory, MarketDataError>;
}

/// Generative prediction capability used by the live prediction path.
#[async_trait]
pub trait PricePredictor: Send + Sync {
    async fn predict_price(
        &self,
        crypto: CryptoCurrency,
        current_price: Decimal,
        timeframe: TimeFrame,
    ) -> Result<PricePrediction, GeminiError>;

    async fn predict_floor_price(
        &self,
        nft: &Nft,
        floor_price: Decimal,
        timeframe: TimeFrame,
    ) -> Result<FloorPricePrediction, GeminiError>;
}
