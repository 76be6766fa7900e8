use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::CryptoCurrency;
use crate::providers::PriceHistory;
use crate::AppState;

use super::ApiResponse;

const DEFAULT_HISTORY_DAYS: u32 = 7;
const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Deserialize)]
pub struct HistoryParams {
    pub days: Option<u32>,
}

#[derive(Serialize)]
pub struct PriceQuote {
    pub crypto_id: CryptoCurrency,
    pub price: Decimal,
}

fn parse_crypto(raw: &str) -> Result<CryptoCurrency, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

/// GET /api/markets/{crypto}/price: live spot price in USD
pub async fn price(
    State(state): State<AppState>,
    Path(crypto): Path<String>,
) -> Result<Json<ApiResponse<PriceQuote>>, AppError> {
    let crypto_id = parse_crypto(&crypto)?;
    let price = state.price_feed.current_price(crypto_id).await?;

    Ok(Json(ApiResponse::ok(PriceQuote { crypto_id, price })))
}

/// GET /api/markets/{crypto}/history?days=N
pub async fn history(
    State(state): State<AppState>,
    Path(crypto): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ApiResponse<PriceHistory>>, AppError> {
    let crypto_id = parse_crypto(&crypto)?;
    let days = params
        .days
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, MAX_HISTORY_DAYS);

    let history = state.price_feed.historical_prices(crypto_id, days).await?;
    Ok(Json(ApiResponse::ok(history)))
}
