use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::WalletState;
use crate::wallet::ConnectOutcome;
use crate::AppState;

use super::ApiResponse;

#[derive(Serialize)]
pub struct ConnectResponse {
    pub outcome: &'static str,
    pub wallet: WalletState,
}

/// GET /api/wallet
pub async fn state(State(state): State<AppState>) -> Json<ApiResponse<WalletState>> {
    Json(ApiResponse::ok(state.wallet.state().await))
}

/// POST /api/wallet/connect
///
/// A missing provider is not an error: the client gets the unchanged state
/// and a "Wallet Not Found" notification.
pub async fn connect(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConnectResponse>>, AppError> {
    let outcome = match state.wallet.connect().await {
        ConnectOutcome::Connected(wallet) => ConnectResponse {
            outcome: "connected",
            wallet,
        },
        ConnectOutcome::ProviderUnavailable => ConnectResponse {
            outcome: "provider_unavailable",
            wallet: state.wallet.state().await,
        },
        ConnectOutcome::Failed(reason) => return Err(AppError::Upstream(reason)),
    };

    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/wallet/disconnect
pub async fn disconnect(State(state): State<AppState>) -> Json<ApiResponse<WalletState>> {
    Json(ApiResponse::ok(state.wallet.disconnect().await))
}
