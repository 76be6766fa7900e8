use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CoinGecko
// ---------------------------------------------------------------------------

/// `/coins/{id}/market_chart` body. Each point is `[unix_millis, price]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMarketChart {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    pub prices: Vec<PricePoint>,
}

impl From<ApiMarketChart> for PriceHistory {
    fn from(chart: ApiMarketChart) -> Self {
        let prices = chart
            .prices
            .into_iter()
            .filter_map(|(millis, price)| {
                let timestamp = DateTime::from_timestamp_millis(millis as i64)?;
                let price = Decimal::try_from(price).ok()?;
                Some(PricePoint { timestamp, price })
            })
            .collect();
        Self { prices }
    }
}

// ---------------------------------------------------------------------------
// Gemini (generateContent)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// JSON object the model is asked to return for a coin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPricePrediction {
    pub predicted_price: f64,
    pub confidence: f64,
}

/// JSON object the model is asked to return for an NFT collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFloorPricePrediction {
    pub predicted_floor_price: f64,
    pub confidence: f64,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Normalized outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PricePrediction {
    pub predicted_price: Decimal,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloorPricePrediction {
    pub predicted_floor_price: Decimal,
    pub confidence: u8,
    pub rationale: String,
}
