use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Nft, NftPrediction};
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub blockchain: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateNftPredictionRequest {
    pub nft_id: String,
    pub timeframe: String,
}

/// GET /api/nfts/search?q=&blockchain=: `data` is null when the query is
/// too short to run.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<ApiResponse<Vec<Nft>>> {
    let found = state
        .nfts
        .search_nfts(&params.q, params.blockchain.as_deref())
        .await;

    Json(ApiResponse {
        success: true,
        data: found,
        error: None,
        source: None,
    })
}

/// GET /api/nft-predictions
pub async fn list_predictions(State(state): State<AppState>) -> Json<ApiResponse<Vec<NftPrediction>>> {
    Json(ApiResponse::ok(state.nfts.get_nft_predictions().await))
}

/// POST /api/nft-predictions
pub async fn create_prediction(
    State(state): State<AppState>,
    Json(req): Json<CreateNftPredictionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NftPrediction>>), AppError> {
    let created = state
        .nfts
        .create_nft_prediction(&req.nft_id, &req.timeframe)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::sourced(created))))
}

/// DELETE /api/nft-predictions
pub async fn clear_predictions(State(state): State<AppState>) -> StatusCode {
    state.nfts.clear_nft_predictions().await;
    StatusCode::NO_CONTENT
}
