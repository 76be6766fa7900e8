use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::providers::{GeminiError, MarketDataError};
use crate::services::contract_service::DeployError;
use crate::services::nft_service::NftError;
use crate::services::prediction_service::PredictionError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Upstream provider error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<PredictionError> for AppError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::NotFound(_) => AppError::NotFound(e.to_string()),
            PredictionError::InvalidRequest(_) => AppError::BadRequest(e.to_string()),
            PredictionError::Storage(inner) => AppError::Internal(inner),
        }
    }
}

impl From<NftError> for AppError {
    fn from(e: NftError) -> Self {
        match e {
            NftError::NotFound(_) => AppError::NotFound(e.to_string()),
            NftError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<DeployError> for AppError {
    fn from(e: DeployError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<MarketDataError> for AppError {
    fn from(e: MarketDataError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<GeminiError> for AppError {
    fn from(e: GeminiError) -> Self {
        AppError::Upstream(e.to_string())
    }
}
