use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::NftPrediction;

/// Session-lifetime list of NFT floor-price predictions, newest first.
#[derive(Clone, Default)]
pub struct NftPredictionStore {
    inner: Arc<Mutex<Vec<NftPrediction>>>,
}

impl NftPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, prediction: NftPrediction) {
        self.inner.lock().await.insert(0, prediction);
    }

    pub async fn list(&self) -> Vec<NftPrediction> {
        self.inner.lock().await.clone()
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let removed = inner.len();
        inner.clear();
        tracing::info!(removed, "NFT prediction store cleared");
    }
}
