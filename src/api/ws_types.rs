use serde::Serialize;

use crate::models::{NftPrediction, Prediction, WalletState};
use crate::services::notifier::Notification;

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "notification")]
    Notification(Notification),

    #[serde(rename = "prediction_created")]
    PredictionCreated(Prediction),

    #[serde(rename = "prediction_verified")]
    PredictionVerified(VerifiedData),

    #[serde(rename = "nft_prediction_created")]
    NftPredictionCreated(NftPrediction),

    #[serde(rename = "wallet_update")]
    WalletUpdate(WalletState),

    /// The wallet switched chains; clients drop chain-bound state and reload.
    #[serde(rename = "reload")]
    Reload(ReloadData),
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifiedData {
    pub id: String,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadData {
    pub reason: String,
    pub chain_id: String,
}
