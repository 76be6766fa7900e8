use axum::Json;

use crate::catalog::{self, CryptoInfo, TimeFrameInfo};

use super::ApiResponse;

/// GET /api/catalog/cryptocurrencies
pub async fn cryptocurrencies() -> Json<ApiResponse<Vec<CryptoInfo>>> {
    Json(ApiResponse::ok(catalog::cryptocurrencies()))
}

/// GET /api/catalog/timeframes
pub async fn timeframes() -> Json<ApiResponse<Vec<TimeFrameInfo>>> {
    Json(ApiResponse::ok(catalog::timeframes()))
}
