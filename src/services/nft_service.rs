use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::db::NftPredictionStore;
use crate::models::{
    is_plausible_price, percentage_change, Nft, NftPrediction, NftSearchRequest,
    PredictionStatus, Sourced, TimeFrame,
};
use crate::providers::PricePredictor;

use super::prediction_service::ServiceMode;
use super::simulator::{self, LatencyProfile};

/// Spread of simulated floor-price moves in mock mode, in percent.
const MOCK_FLOOR_SPREAD: f64 = 10.0;

/// Spread used when the live provider fails, in percent.
const FALLBACK_FLOOR_SPREAD: f64 = 5.0;

pub const FALLBACK_RATIONALE: &str = "Based on general market trends and historical data.";

#[derive(Debug, Error)]
pub enum NftError {
    #[error("NFT with ID {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}

pub struct NftService {
    mode: ServiceMode,
    catalog: Vec<Nft>,
    store: NftPredictionStore,
    predictor: Option<Arc<dyn PricePredictor>>,
    latency: LatencyProfile,
}

impl NftService {
    pub fn new(
        mode: ServiceMode,
        catalog: Vec<Nft>,
        store: NftPredictionStore,
        latency: LatencyProfile,
    ) -> Self {
        Self {
            mode,
            catalog,
            store,
            predictor: None,
            latency,
        }
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn PricePredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Catalog search. There is no live NFT index, so this always reads the
    /// local catalog.
    pub async fn search_nfts(&self, request: &NftSearchRequest) -> Vec<Nft> {
        simulator::simulate_delay(self.latency.nft_search).await;

        let found: Vec<Nft> = self
            .catalog
            .iter()
            .filter(|nft| nft.matches(request))
            .cloned()
            .collect();

        tracing::debug!(
            query = %request.query,
            blockchain = ?request.blockchain,
            found = found.len(),
            "NFT search"
        );
        found
    }

    pub fn get_nft(&self, id: &str) -> Option<&Nft> {
        self.catalog.iter().find(|nft| nft.id == id)
    }

    /// Predict the floor price of an NFT's collection and store the result.
    pub async fn generate_nft_prediction(
        &self,
        nft_id: &str,
        timeframe: TimeFrame,
    ) -> Result<Sourced<NftPrediction>, NftError> {
        let nft = self
            .get_nft(nft_id)
            .ok_or_else(|| NftError::NotFound(nft_id.to_string()))?;
        let floor = nft
            .floor_price
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| NftError::Validation(format!("{} has no floor price", nft.name)))?;

        let result = match (self.mode, &self.predictor) {
            (ServiceMode::Mock, _) => Sourced::Simulated(simulate_mock(nft, floor, timeframe)),
            (ServiceMode::Live, Some(predictor)) => {
                match predictor.predict_floor_price(nft, floor, timeframe).await {
                    Ok(generated)
                        if is_plausible_price(floor, generated.predicted_floor_price) =>
                    {
                        let predicted = generated.predicted_floor_price;
                        Sourced::Live(build(
                            format!("nftpred-{}", Uuid::new_v4().simple()),
                            nft,
                            floor,
                            predicted,
                            generated.confidence,
                            timeframe,
                            generated.rationale,
                        ))
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            nft = %nft.name,
                            "NFT prediction provider failed, using fallback"
                        );
                        Sourced::Simulated(simulate_fallback(nft, floor, timeframe))
                    }
                    Ok(generated) => {
                        tracing::warn!(
                            nft = %nft.name,
                            predicted = %generated.predicted_floor_price,
                            "Generated floor price out of range, using fallback"
                        );
                        Sourced::Simulated(simulate_fallback(nft, floor, timeframe))
                    }
                }
            }
            (ServiceMode::Live, None) => {
                tracing::warn!("Live mode without a predictor, using fallback NFT prediction");
                Sourced::Simulated(simulate_fallback(nft, floor, timeframe))
            }
        };

        counter!("nft_predictions_total", "source" => result.source().as_str()).increment(1);
        self.store.insert(result.get().clone()).await;
        Ok(result)
    }

    pub async fn nft_predictions(&self) -> Vec<NftPrediction> {
        self.store.list().await
    }

    pub async fn clear_nft_predictions(&self) {
        self.store.clear().await;
    }
}

fn build(
    id: String,
    nft: &Nft,
    current: Decimal,
    predicted: Decimal,
    confidence: u8,
    timeframe: TimeFrame,
    rationale: String,
) -> NftPrediction {
    NftPrediction {
        id,
        nft_id: nft.id.clone(),
        nft_name: nft.name.clone(),
        nft_image: nft.image.clone(),
        collection: nft.collection.clone(),
        current_floor_price: current,
        predicted_floor_price: predicted,
        percentage_change: percentage_change(current, predicted),
        confidence,
        timestamp: Utc::now(),
        timeframe,
        prediction_rationale: rationale,
        status: PredictionStatus::Completed,
    }
}

fn mock_rationale(collection: &str, rising: bool) -> String {
    let templates = [
        format!(
            "Based on recent sales and market sentiment, {} interest in {collection} suggests a {} trend.",
            if rising { "increased" } else { "decreased" },
            if rising { "positive" } else { "negative" },
        ),
        format!(
            "Market analysis indicates {collection} may experience {} due to upcoming project developments and community engagement.",
            if rising { "growth" } else { "decline" },
        ),
        format!(
            "Considering current market conditions and trading volume, {collection} is likely to {} in the short term.",
            if rising { "appreciate" } else { "depreciate" },
        ),
    ];

    templates
        .choose(&mut rand::rng())
        .cloned()
        .unwrap_or_default()
}

fn simulate_mock(nft: &Nft, floor: Decimal, timeframe: TimeFrame) -> NftPrediction {
    let change = simulator::random_change_pct(MOCK_FLOOR_SPREAD);
    let predicted = simulator::apply_change(floor, change);
    build(
        format!("nftpred-{}", Uuid::new_v4().simple()),
        nft,
        floor,
        predicted,
        simulator::random_confidence(),
        timeframe,
        mock_rationale(&nft.collection, change > Decimal::ZERO),
    )
}

fn simulate_fallback(nft: &Nft, floor: Decimal, timeframe: TimeFrame) -> NftPrediction {
    let change = simulator::random_change_pct(FALLBACK_FLOOR_SPREAD);
    let predicted = simulator::apply_change(floor, change);
    build(
        format!("nftpred-{}-fallback", Uuid::new_v4().simple()),
        nft,
        floor,
        predicted,
        simulator::random_confidence(),
        timeframe,
        FALLBACK_RATIONALE.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::nft_catalog;
    use crate::models::CryptoCurrency;
    use crate::providers::{FloorPricePrediction, GeminiError, PricePrediction};
    use async_trait::async_trait;

    struct FailingPredictor;

    #[async_trait]
    impl PricePredictor for FailingPredictor {
        async fn predict_price(
            &self,
            _: CryptoCurrency,
            _: Decimal,
            _: TimeFrame,
        ) -> Result<PricePrediction, GeminiError> {
            Err(GeminiError::EmptyResponse)
        }

        async fn predict_floor_price(
            &self,
            _: &Nft,
            _: Decimal,
            _: TimeFrame,
        ) -> Result<FloorPricePrediction, GeminiError> {
            Err(GeminiError::Status {
                status: 429,
                body: "quota".into(),
            })
        }
    }

    struct AbsurdFloorPredictor(Decimal);

    #[async_trait]
    impl PricePredictor for AbsurdFloorPredictor {
        async fn predict_price(
            &self,
            _: CryptoCurrency,
            _: Decimal,
            _: TimeFrame,
        ) -> Result<PricePrediction, GeminiError> {
            Err(GeminiError::EmptyResponse)
        }

        async fn predict_floor_price(
            &self,
            _: &Nft,
            _: Decimal,
            _: TimeFrame,
        ) -> Result<FloorPricePrediction, GeminiError> {
            Ok(FloorPricePrediction {
                predicted_floor_price: self.0,
                confidence: 80,
                rationale: "to the moon".into(),
            })
        }
    }

    fn service(mode: ServiceMode) -> NftService {
        NftService::new(mode, nft_catalog(), NftPredictionStore::new(), LatencyProfile::none())
            .with_predictor(Arc::new(FailingPredictor))
    }

    #[tokio::test]
    async fn test_search_by_collection_and_chain() {
        let svc = service(ServiceMode::Mock);

        let eth = svc
            .search_nfts(&NftSearchRequest {
                query: "a".into(),
                blockchain: Some("ethereum".into()),
            })
            .await;
        assert!(eth.iter().all(|n| n.blockchain == "Ethereum"));
        assert!(!eth.is_empty());

        let degods = svc
            .search_nfts(&NftSearchRequest {
                query: "degods".into(),
                blockchain: None,
            })
            .await;
        assert_eq!(degods.len(), 1);
        assert_eq!(degods[0].id, "nft-3");
    }

    #[tokio::test]
    async fn test_mock_prediction_within_ten_percent() {
        let svc = service(ServiceMode::Mock);

        for _ in 0..50 {
            let result = svc.generate_nft_prediction("nft-1", TimeFrame::Week).await.unwrap();
            assert!(!result.is_live());
            let p = result.into_inner();
            assert_eq!(
                p.percentage_change,
                percentage_change(p.current_floor_price, p.predicted_floor_price)
            );
            assert!(p.percentage_change.abs() <= Decimal::new(1003, 2));
            assert!(!p.prediction_rationale.is_empty());
        }

        assert_eq!(svc.nft_predictions().await.len(), 50);
        svc.clear_nft_predictions().await;
        assert!(svc.nft_predictions().await.is_empty());
    }

    #[tokio::test]
    async fn test_live_failure_uses_fallback() {
        let svc = service(ServiceMode::Live);
        let result = svc.generate_nft_prediction("nft-2", TimeFrame::Month).await.unwrap();

        assert!(!result.is_live());
        let p = result.into_inner();
        assert!(p.id.ends_with("-fallback"));
        assert_eq!(p.prediction_rationale, FALLBACK_RATIONALE);
        assert!(p.percentage_change.abs() <= Decimal::new(503, 2));
    }

    #[tokio::test]
    async fn test_unknown_nft() {
        let svc = service(ServiceMode::Mock);
        let err = svc.generate_nft_prediction("nft-99", TimeFrame::Day).await.unwrap_err();
        assert!(matches!(err, NftError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_absurd_floor_price_uses_fallback() {
        for absurd in [
            Decimal::from_i128_with_scale(10_i128.pow(27), 0),
            Decimal::ZERO,
            Decimal::from(-1),
        ] {
            let svc = NftService::new(
                ServiceMode::Live,
                nft_catalog(),
                NftPredictionStore::new(),
                LatencyProfile::none(),
            )
            .with_predictor(Arc::new(AbsurdFloorPredictor(absurd)));

            let result = svc.generate_nft_prediction("nft-1", TimeFrame::Week).await.unwrap();
            assert!(!result.is_live(), "{absurd} was accepted");

            let p = result.into_inner();
            assert!(p.id.ends_with("-fallback"));
            assert_eq!(p.prediction_rationale, FALLBACK_RATIONALE);
            assert!(p.predicted_floor_price > Decimal::ZERO);
        }
    }
}
