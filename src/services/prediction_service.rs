use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use thiserror::Error;

use crate::catalog::{crypto_info, seed_predictions};
use crate::db::PredictionRepository;
use crate::models::{
    is_plausible_price, percentage_change, Prediction, PredictionRequest, PredictionStatus,
    Sourced, VerificationResult,
};
use crate::providers::{PriceFeed, PricePredictor};

use super::digest::sha256_hex;
use super::simulator::{self, LatencyProfile};

pub const VERIFIED_MESSAGE: &str = "Prediction successfully verified against blockchain data";
pub const MISMATCH_MESSAGE: &str = "Verification failed. Hash does not match on-chain data";
pub const NOT_FOUND_MESSAGE: &str = "Prediction not found";

/// Whether operations use the external providers or local simulation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    Mock,
    Live,
}

impl ServiceMode {
    pub fn from_mock_flag(use_mock_data: bool) -> Self {
        if use_mock_data {
            ServiceMode::Mock
        } else {
            ServiceMode::Live
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMode::Mock => "mock",
            ServiceMode::Live => "live",
        }
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Prediction with ID {0} not found")]
    NotFound(String),

    #[error("Invalid prediction request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Prediction operations with mock/live switching.
///
/// Provider failures never reach callers: they degrade to simulated output,
/// and the result is tagged so callers can tell the two apart.
pub struct PredictionService {
    mode: ServiceMode,
    repo: Arc<dyn PredictionRepository>,
    price_feed: Option<Arc<dyn PriceFeed>>,
    predictor: Option<Arc<dyn PricePredictor>>,
    latency: LatencyProfile,
}

impl PredictionService {
    pub fn new(
        mode: ServiceMode,
        repo: Arc<dyn PredictionRepository>,
        latency: LatencyProfile,
    ) -> Self {
        Self {
            mode,
            repo,
            price_feed: None,
            predictor: None,
            latency,
        }
    }

    pub fn with_price_feed(mut self, feed: Arc<dyn PriceFeed>) -> Self {
        self.price_feed = Some(feed);
        self
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn PricePredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn mode(&self) -> ServiceMode {
        self.mode
    }

    fn is_mock(&self) -> bool {
        self.mode == ServiceMode::Mock
    }

    /// Generate a prediction and store it at the head of the list.
    pub async fn request_prediction(&self, request: PredictionRequest) -> Sourced<Prediction> {
        counter!("predictions_requested_total", "mode" => self.mode.as_str()).increment(1);

        let result = if self.is_mock() {
            simulator::simulate_delay(self.latency.request).await;
            Sourced::Simulated(self.simulate(&request).await)
        } else {
            self.request_live(&request).await
        };

        if let Err(e) = self.repo.insert(result.get().clone()).await {
            tracing::error!(error = %e, id = %result.get().id, "Failed to store prediction");
        }

        tracing::info!(
            id = %result.get().id,
            crypto = %request.crypto_id,
            timeframe = %request.timeframe,
            source = %result.source(),
            "Prediction created"
        );
        result
    }

    /// Anchor on the latest stored price for the coin, else the catalog price.
    async fn simulate(&self, request: &PredictionRequest) -> Prediction {
        let info = crypto_info(request.crypto_id);
        let anchor = match self.repo.list().await {
            Ok(all) => all
                .iter()
                .find(|p| p.crypto_id == request.crypto_id)
                .map(|p| p.current_price)
                .filter(|price| !price.is_zero())
                .unwrap_or(info.reference_price),
            Err(e) => {
                tracing::warn!(error = %e, "Prediction store unavailable, using reference price");
                info.reference_price
            }
        };

        simulator::simulate_prediction(request, info.name, anchor)
    }

    async fn request_live(&self, request: &PredictionRequest) -> Sourced<Prediction> {
        let Some(feed) = &self.price_feed else {
            tracing::warn!("Live mode without a price feed, simulating prediction");
            return self.fallback(request, "no_price_feed").await;
        };

        let current_price = match feed.current_price(request.crypto_id).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    crypto = %request.crypto_id,
                    "Live price fetch failed, falling back to simulated prediction"
                );
                return self.fallback(request, "price_feed").await;
            }
        };

        let generated = match &self.predictor {
            Some(predictor) => predictor
                .predict_price(request.crypto_id, current_price, request.timeframe)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        error = %e,
                        crypto = %request.crypto_id,
                        "Generative prediction failed, simulating from live price"
                    );
                })
                .ok()
                .filter(|generated| {
                    let plausible = is_plausible_price(current_price, generated.predicted_price);
                    if !plausible {
                        tracing::warn!(
                            crypto = %request.crypto_id,
                            current = %current_price,
                            predicted = %generated.predicted_price,
                            "Generated price out of range, simulating from live price"
                        );
                    }
                    plausible
                }),
            None => None,
        };

        let is_live = generated.is_some();
        if !is_live {
            counter!("prediction_fallbacks_total", "reason" => "predictor").increment(1);
        }
        let generated =
            generated.unwrap_or_else(|| simulator::simulate_price_prediction(current_price));

        let now = Utc::now();
        let mut prediction = Prediction {
            id: simulator::new_prediction_id(),
            crypto_id: request.crypto_id,
            crypto_name: crypto_info(request.crypto_id).name.to_string(),
            current_price,
            predicted_price: generated.predicted_price,
            percentage_change: percentage_change(current_price, generated.predicted_price),
            confidence: generated.confidence,
            timestamp: now,
            timeframe: request.timeframe,
            status: PredictionStatus::Completed,
            verification_hash: None,
        };

        if is_live {
            prediction.verification_hash = Some(live_verification_hash(&prediction));
            Sourced::Live(prediction)
        } else {
            prediction.verification_hash = Some(simulator::mock_verification_hash(now));
            Sourced::Simulated(prediction)
        }
    }

    async fn fallback(&self, request: &PredictionRequest, reason: &'static str) -> Sourced<Prediction> {
        counter!("prediction_fallbacks_total", "reason" => reason).increment(1);
        Sourced::Simulated(self.simulate(request).await)
    }

    /// Snapshot of stored predictions, newest first.
    pub async fn fetch_predictions(&self) -> Sourced<Vec<Prediction>> {
        if self.is_mock() {
            simulator::simulate_delay(self.latency.list).await;
        }

        match self.repo.list().await {
            Ok(all) if self.is_mock() => Sourced::Simulated(all),
            Ok(all) => Sourced::Live(all),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list predictions, serving seed list");
                Sourced::Simulated(seed_predictions())
            }
        }
    }

    pub async fn fetch_prediction_by_id(&self, id: &str) -> Result<Prediction, PredictionError> {
        if self.is_mock() {
            simulator::simulate_delay(self.latency.lookup).await;
        }

        self.repo
            .get(id)
            .await?
            .ok_or_else(|| PredictionError::NotFound(id.to_string()))
    }

    /// Compare `hash` with the stored hash; promote `completed` to `verified`
    /// on a match. Unknown ids are reported in the result, not as an error.
    pub async fn verify_prediction(
        &self,
        id: &str,
        hash: &str,
    ) -> Result<VerificationResult, PredictionError> {
        if self.is_mock() {
            simulator::simulate_delay(self.latency.verify).await;
        }

        let Some(prediction) = self.repo.get(id).await? else {
            counter!("verifications_total", "result" => "not_found").increment(1);
            return Ok(VerificationResult {
                is_verified: false,
                original_timestamp: None,
                original_prediction: None,
                message: NOT_FOUND_MESSAGE.into(),
            });
        };

        let is_verified = prediction.verification_hash.as_deref() == Some(hash);

        if is_verified && prediction.status == PredictionStatus::Completed {
            self.repo
                .update_status(id, PredictionStatus::Verified)
                .await?;
        }

        counter!(
            "verifications_total",
            "result" => if is_verified { "verified" } else { "mismatch" }
        )
        .increment(1);
        tracing::info!(id, is_verified, "Prediction verification");

        Ok(VerificationResult {
            is_verified,
            original_timestamp: Some(prediction.timestamp),
            original_prediction: Some(prediction.predicted_price),
            message: if is_verified {
                VERIFIED_MESSAGE.into()
            } else {
                MISMATCH_MESSAGE.into()
            },
        })
    }
}

/// `0x`-prefixed digest binding the record's identity and numbers.
fn live_verification_hash(p: &Prediction) -> String {
    let material = format!(
        "{}|{}|{}|{}|{}|{}",
        p.id,
        p.crypto_id,
        p.timeframe,
        p.current_price,
        p.predicted_price,
        p.timestamp.timestamp_millis(),
    );
    format!("0x{}", sha256_hex(&material))
}
