use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::errors::AppError;
use crate::models::{DeployParams, DeployedContract};
use crate::AppState;

use super::ApiResponse;

/// POST /api/contracts/deploy: simulated deployment from the connected wallet
pub async fn deploy(
    State(state): State<AppState>,
    Json(params): Json<DeployParams>,
) -> Result<(StatusCode, Json<ApiResponse<DeployedContract>>), AppError> {
    let deployed = state.contracts.deploy_contract(&params).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(deployed))))
}

/// GET /api/contracts/latest
pub async fn latest(State(state): State<AppState>) -> Json<ApiResponse<DeployedContract>> {
    Json(ApiResponse {
        success: true,
        data: state.contracts.last_deployed().await,
        error: None,
        source: None,
    })
}
