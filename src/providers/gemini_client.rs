use std::sync::LazyLock;
use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use regex::Regex;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use super::types::{
    FloorPricePrediction, GenerateContentResponse, PricePrediction, RawFloorPricePrediction,
    RawPricePrediction,
};
use super::PricePredictor;
use crate::models::{round_price, CryptoCurrency, Nft, TimeFrame};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Greedy: first `{` through the last `}`.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("static regex"));

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid or empty response from Gemini")]
    EmptyResponse,

    #[error("could not parse Gemini output: {0}")]
    Parse(String),
}

/// Find the embedded JSON object in free text.
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

/// Parse JSON, retrying once with trailing commas stripped.
pub fn parse_json_lenient<T: DeserializeOwned>(raw: &str) -> Result<T, GeminiError> {
    match serde_json::from_str(raw) {
        Ok(parsed) => Ok(parsed),
        Err(original) => {
            let cleaned = TRAILING_COMMA.replace_all(raw, "$1");
            serde_json::from_str(&cleaned).map_err(|e| {
                GeminiError::Parse(format!("{e} (original error: {original})"))
            })
        }
    }
}

/// Ceiling on a model-generated price; anything above is treated as garbage.
const MAX_GENERATED_PRICE: f64 = 1e12;

fn to_price(value: f64, field: &str) -> Result<Decimal, GeminiError> {
    if !(value > 0.0 && value <= MAX_GENERATED_PRICE) {
        return Err(GeminiError::Parse(format!("{field}={value} out of range")));
    }
    Decimal::try_from(value)
        .map(round_price)
        .map_err(|e| GeminiError::Parse(format!("{field}={value}: {e}")))
}

fn to_confidence(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Extract `{predictedPrice, confidence}` from model output.
pub fn parse_price_prediction(text: &str) -> Result<PricePrediction, GeminiError> {
    let json = extract_json_object(text)
        .ok_or_else(|| GeminiError::Parse("no JSON object in response".into()))?;
    let raw: RawPricePrediction = parse_json_lenient(json)?;

    Ok(PricePrediction {
        predicted_price: to_price(raw.predicted_price, "predictedPrice")?,
        confidence: to_confidence(raw.confidence),
    })
}

/// Extract `{predictedFloorPrice, confidence, rationale}` from model output.
pub fn parse_floor_price_prediction(text: &str) -> Result<FloorPricePrediction, GeminiError> {
    let json = extract_json_object(text)
        .ok_or_else(|| GeminiError::Parse("no JSON object in response".into()))?;
    let raw: RawFloorPricePrediction = parse_json_lenient(json)?;

    Ok(FloorPricePrediction {
        predicted_floor_price: to_price(raw.predicted_floor_price, "predictedFloorPrice")?,
        confidence: to_confidence(raw.confidence),
        rationale: raw.rationale,
    })
}

pub fn price_prompt(crypto: CryptoCurrency, current_price: Decimal, timeframe: TimeFrame) -> String {
    let days = timeframe.days();
    format!(
        "You are a cryptocurrency price prediction AI.\n\
         Based on current market trends, historical data, and technical analysis:\n\
         \n\
         Crypto: {crypto}\n\
         Current price: ${current_price}\n\
         Prediction timeframe: {days} days\n\
         \n\
         Provide a JSON object with exactly two fields:\n\
         1. \"predictedPrice\": a number representing your predicted price in USD after {days} days\n\
         2. \"confidence\": a number between 60 and 95 representing your confidence percentage in this prediction\n\
         \n\
         Format your response as valid JSON with no additional text or explanation."
    )
}

pub fn floor_price_prompt(nft: &Nft, floor_price: Decimal, timeframe: TimeFrame) -> String {
    let days = timeframe.days();
    format!(
        "You are an NFT market prediction AI.\n\
         Based on current market trends, historical data, and NFT collection analysis:\n\
         \n\
         NFT: {}\n\
         Collection: {}\n\
         Current floor price: {} ETH\n\
         Blockchain: {}\n\
         Prediction timeframe: {days} days\n\
         \n\
         Provide a JSON object with exactly these fields:\n\
         1. \"predictedFloorPrice\": a number representing your predicted floor price in ETH after {days} days\n\
         2. \"confidence\": a number between 60 and 95 representing your confidence percentage in this prediction\n\
         3. \"rationale\": a brief 1-2 sentence explanation of your prediction\n\
         \n\
         Format your response as valid JSON with no additional text or explanation.",
        nft.name, nft.collection, floor_price, nft.blockchain,
    )
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    /// Send a single-prompt `generateContent` call and return the first text part.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let payload = json!({
            "contents": [{
                "parts": [
                    { "text": prompt }
                ]
            }]
        });

        let mut req = self.http.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let start = Instant::now();
        let resp = req.send().await?;
        histogram!("provider_request_seconds", "provider" => "gemini")
            .record(start.elapsed().as_secs_f64());

        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(status = %status, model = %self.model, "Gemini returned non-2xx");
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| GeminiError::Parse(format!("generateContent body: {e}")))?;

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or(GeminiError::EmptyResponse)
    }
}

#[async_trait]
impl PricePredictor for GeminiClient {
    async fn predict_price(
        &self,
        crypto: CryptoCurrency,
        current_price: Decimal,
        timeframe: TimeFrame,
    ) -> Result<PricePrediction, GeminiError> {
        let prompt = price_prompt(crypto, current_price, timeframe);
        let text = self.generate_text(&prompt).await?;
        tracing::debug!(crypto = %crypto, response = %text, "Gemini price response");
        parse_price_prediction(&text)
    }

    async fn predict_floor_price(
        &self,
        nft: &Nft,
        floor_price: Decimal,
        timeframe: TimeFrame,
    ) -> Result<FloorPricePrediction, GeminiError> {
        let prompt = floor_price_prompt(nft, floor_price, timeframe);
        tracing::debug!(nft = %nft.name, "Sending NFT prediction request to Gemini");
        let text = self.generate_text(&prompt).await?;
        parse_floor_price_prediction(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_output() {
        let text = "Sure! Here you go:\n```json\n{\"predictedPrice\": 70123.456, \"confidence\": 81.6}\n```";
        let json = extract_json_object(text).unwrap();
        assert!(json.starts_with('{') && json.ends_with('}'));

        let p = parse_price_prediction(text).unwrap();
        assert_eq!(p.predicted_price, Decimal::new(7012346, 2));
        assert_eq!(p.confidence, 82);
    }

    #[test]
    fn test_no_json_is_parse_error() {
        let err = parse_price_prediction("I cannot predict prices.").unwrap_err();
        assert!(matches!(err, GeminiError::Parse(_)));
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let err = parse_price_prediction(r#"{"predictedPrice": 100}"#).unwrap_err();
        assert!(matches!(err, GeminiError::Parse(_)));
    }

    #[test]
    fn test_string_price_is_rejected() {
        let err = parse_price_prediction(r#"{"predictedPrice": "100", "confidence": 70}"#)
            .unwrap_err();
        assert!(matches!(err, GeminiError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_price_is_parse_error() {
        for text in [
            r#"{"predictedPrice": 1e27, "confidence": 70}"#,
            r#"{"predictedPrice": 0, "confidence": 70}"#,
            r#"{"predictedPrice": -12.5, "confidence": 70}"#,
        ] {
            let err = parse_price_prediction(text).unwrap_err();
            assert!(matches!(err, GeminiError::Parse(_)), "{text}");
        }

        let floor = parse_floor_price_prediction(
            r#"{"predictedFloorPrice": 1e30, "confidence": 60, "rationale": "moon"}"#,
        );
        assert!(matches!(floor, Err(GeminiError::Parse(_))));
    }

    #[test]
    fn test_trailing_comma_is_tolerated() {
        let p = parse_price_prediction("{\"predictedPrice\": 1.5, \"confidence\": 70,\n}").unwrap();
        assert_eq!(p.predicted_price, Decimal::new(150, 2));
        assert_eq!(p.confidence, 70);
    }

    #[test]
    fn test_floor_price_prediction_requires_rationale() {
        let ok = parse_floor_price_prediction(
            r#"{"predictedFloorPrice": 19.237, "confidence": 74, "rationale": "Steady demand."}"#,
        )
        .unwrap();
        assert_eq!(ok.predicted_floor_price, Decimal::new(1924, 2));
        assert_eq!(ok.rationale, "Steady demand.");

        assert!(parse_floor_price_prediction(r#"{"predictedFloorPrice": 19, "confidence": 74}"#)
            .is_err());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let p = parse_price_prediction(r#"{"predictedPrice": 10, "confidence": 140}"#).unwrap();
        assert_eq!(p.confidence, 100);
    }

    #[test]
    fn test_price_prompt_embeds_inputs() {
        let prompt = price_prompt(CryptoCurrency::Sol, Decimal::new(13790, 2), TimeFrame::Year);
        assert!(prompt.contains("Crypto: SOL"));
        assert!(prompt.contains("Current price: $137.90"));
        assert!(prompt.contains("365 days"));
    }

    #[test]
    fn test_first_text_skips_empty() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#,
        )
        .unwrap();
        assert!(resp.first_text().is_none());

        let resp: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(resp.first_text().is_none());
    }
}
