//! Local stand-in for the prediction providers: random prices, confidences
//! and verification hashes, plus the artificial latency mock mode applies.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    percentage_change, round_price, Prediction, PredictionRequest, PredictionStatus,
};
use crate::providers::PricePrediction;

pub const MIN_CONFIDENCE: u8 = 65;
pub const MAX_CONFIDENCE: u8 = 90;

/// Spread of the simulated move for coin predictions, in percent.
pub const PRICE_CHANGE_SPREAD: f64 = 5.0;

/// Spread of the jitter applied to the anchor price, in percent.
const CURRENT_PRICE_JITTER: f64 = 2.0;

/// Delays applied in mock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub request: Duration,
    pub list: Duration,
    pub lookup: Duration,
    pub verify: Duration,
    pub nft_search: Duration,
    pub contract_deploy: Duration,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            request: Duration::from_millis(1200),
            list: Duration::from_millis(800),
            lookup: Duration::from_millis(500),
            verify: Duration::from_millis(1500),
            nft_search: Duration::from_millis(500),
            contract_deploy: Duration::from_millis(3000),
        }
    }
}

impl LatencyProfile {
    pub fn none() -> Self {
        Self {
            request: Duration::ZERO,
            list: Duration::ZERO,
            lookup: Duration::ZERO,
            verify: Duration::ZERO,
            nft_search: Duration::ZERO,
            contract_deploy: Duration::ZERO,
        }
    }
}

pub async fn simulate_delay(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

pub fn random_confidence() -> u8 {
    rand::rng().random_range(MIN_CONFIDENCE..=MAX_CONFIDENCE)
}

/// Uniform percentage in `[-spread, spread]`, kept to 4 decimals.
pub fn random_change_pct(spread: f64) -> Decimal {
    let pct: f64 = rand::rng().random_range(-spread..=spread);
    Decimal::try_from(pct)
        .map(|d| d.round_dp(4))
        .unwrap_or(Decimal::ZERO)
}

/// `price * (1 + pct / 100)`, rounded with [`round_price`].
pub fn apply_change(price: Decimal, pct: Decimal) -> Decimal {
    round_price(price * (Decimal::ONE + pct / Decimal::ONE_HUNDRED))
}

pub fn new_prediction_id() -> String {
    format!("pred-{}", Uuid::new_v4().simple())
}

/// Opaque `hash-{millis}-{n}` token stored with simulated predictions.
pub fn mock_verification_hash(now: DateTime<Utc>) -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("hash-{}-{}", now.timestamp_millis(), n)
}

/// Predicted price and confidence for a known current price.
pub fn simulate_price_prediction(current_price: Decimal) -> PricePrediction {
    PricePrediction {
        predicted_price: apply_change(current_price, random_change_pct(PRICE_CHANGE_SPREAD)),
        confidence: random_confidence(),
    }
}

/// Full simulated prediction around `anchor_price`.
///
/// The current price is the anchor jittered by up to ±2%; the prediction
/// moves it by up to ±5%. Status is `completed` straight away.
pub fn simulate_prediction(
    request: &PredictionRequest,
    crypto_name: &str,
    anchor_price: Decimal,
) -> Prediction {
    let now = Utc::now();
    let current_price = apply_change(anchor_price, random_change_pct(CURRENT_PRICE_JITTER));
    let PricePrediction {
        predicted_price,
        confidence,
    } = simulate_price_prediction(current_price);

    Prediction {
        id: new_prediction_id(),
        crypto_id: request.crypto_id,
        crypto_name: crypto_name.to_string(),
        current_price,
        predicted_price,
        percentage_change: percentage_change(current_price, predicted_price),
        confidence,
        timestamp: now,
        timeframe: request.timeframe,
        status: PredictionStatus::Completed,
        verification_hash: Some(mock_verification_hash(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CryptoCurrency, TimeFrame};

    fn btc_month() -> PredictionRequest {
        PredictionRequest {
            crypto_id: CryptoCurrency::Btc,
            timeframe: TimeFrame::Month,
        }
    }

    #[test]
    fn test_simulated_predictions_hold_invariants() {
        let anchor = Decimal::new(4_236_589, 2);
        for _ in 0..500 {
            let p = simulate_prediction(&btc_month(), "Bitcoin", anchor);

            assert_eq!(
                p.percentage_change,
                percentage_change(p.current_price, p.predicted_price)
            );
            assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&p.confidence));
            assert_eq!(p.status, PredictionStatus::Completed);
            assert!(p.verification_hash.as_deref().is_some_and(|h| h.starts_with("hash-")));

            // ±2% jitter on the anchor, then ±5% move
            let jitter = (p.current_price - anchor).abs() / anchor;
            assert!(jitter <= Decimal::new(201, 4), "jitter {jitter}");
            let pct_move = p.percentage_change.abs();
            assert!(pct_move <= Decimal::new(501, 2), "move {pct_move}");
        }
    }

    #[test]
    fn test_change_pct_within_spread() {
        for _ in 0..500 {
            let pct = random_change_pct(5.0);
            assert!(pct >= Decimal::from(-5) && pct <= Decimal::from(5));
        }
    }

    #[test]
    fn test_apply_change() {
        assert_eq!(
            apply_change(Decimal::from(200), Decimal::from(5)),
            Decimal::from(210)
        );
        assert_eq!(
            apply_change(Decimal::new(1000, 2), Decimal::new(-125, 2)),
            Decimal::new(988, 2)
        );
    }

    #[test]
    fn test_sub_dollar_coin_moves() {
        let anchor = Decimal::new(8, 2);
        let request = PredictionRequest {
            crypto_id: CryptoCurrency::Doge,
            timeframe: TimeFrame::Week,
        };

        let moved = (0..50)
            .map(|_| simulate_prediction(&request, "Dogecoin", anchor))
            .filter(|p| p.predicted_price != p.current_price)
            .count();
        assert!(moved > 0);

        assert_eq!(
            apply_change(anchor, Decimal::new(-125, 2)),
            Decimal::new(79, 3)
        );
    }

    #[test]
    fn test_ids_and_hashes_are_distinct() {
        let now = Utc::now();
        assert_ne!(new_prediction_id(), new_prediction_id());
        assert!(mock_verification_hash(now)
            .starts_with(&format!("hash-{}-", now.timestamp_millis())));
    }
}
