use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Prediction, VerificationResult};
use crate::AppState;

use super::ApiResponse;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreatePredictionRequest {
    pub crypto_id: String,
    pub timeframe: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub id: String,
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/predictions: newest first
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<Prediction>>> {
    Json(ApiResponse::sourced(state.predictions.get_predictions().await))
}

/// GET /api/predictions/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Prediction>>, AppError> {
    let prediction = state
        .predictions
        .get_prediction_by_id(&id)
        .await?
        .ok_or_else(|| AppError::BadRequest("prediction id is required".into()))?;

    Ok(Json(ApiResponse::ok(prediction)))
}

/// POST /api/predictions: generate and store a prediction
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePredictionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Prediction>>), AppError> {
    let created = state
        .predictions
        .create_prediction(&req.crypto_id, &req.timeframe)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::sourced(created))))
}

/// POST /api/predictions/verify: compare a hash with the stored one
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<VerificationResult>>, AppError> {
    let result = state
        .predictions
        .verify_prediction_hash(req.id.trim(), req.hash.trim())
        .await?;

    Ok(Json(ApiResponse::ok(result)))
}
