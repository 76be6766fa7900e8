use serde::Serialize;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::models::wallet::short_address;
use crate::models::{NftPrediction, Prediction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// User-facing, dismissible notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }
}

/// Fans notifications and state changes out to dashboard clients.
/// Having no subscribers is normal and never an error.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<WsMessage>,
}

impl Notifier {
    pub fn new(tx: broadcast::Sender<WsMessage>) -> Self {
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }

    pub fn notify(&self, notification: Notification) {
        match notification.variant {
            Variant::Default => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            Variant::Destructive => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
        self.publish(WsMessage::Notification(notification));
    }

    pub fn publish(&self, message: WsMessage) {
        if self.tx.send(message).is_err() {
            tracing::trace!("No dashboard subscribers for broadcast");
        }
    }
}

pub fn prediction_created(prediction: &Prediction) -> Notification {
    Notification::info(
        "Prediction Created",
        format!("Your {} prediction has been created.", prediction.crypto_id),
    )
}

pub fn nft_prediction_created(prediction: &NftPrediction) -> Notification {
    Notification::info(
        "NFT Prediction Created",
        format!("Your prediction for {} has been created.", prediction.nft_name),
    )
}

pub fn wallet_connected(account: &str) -> Notification {
    Notification::info("Wallet Connected", format!("Connected to {}", short_address(account)))
}

pub fn account_changed(account: &str) -> Notification {
    Notification::info("Account Changed", format!("Connected to {}", short_address(account)))
}

pub fn network_error(target_chain_id: &str) -> Notification {
    Notification::error(
        "Network Error",
        format!("Please switch to the correct network in your wallet. Chain ID: {target_chain_id}"),
    )
}
