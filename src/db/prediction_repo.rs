use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{Prediction, PredictionStatus};

/// Storage seam for predictions.
///
/// Callers only see this trait, so the in-memory list can be swapped for a
/// real datastore without touching the service layer.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Insert a prediction at the head of the list (newest first).
    async fn insert(&self, prediction: Prediction) -> anyhow::Result<()>;

    /// Snapshot of all predictions, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Prediction>>;

    async fn get(&self, id: &str) -> anyhow::Result<Option<Prediction>>;

    /// Set the status of a prediction. Returns the updated record, or `None`
    /// if the id is unknown.
    async fn update_status(
        &self,
        id: &str,
        status: PredictionStatus,
    ) -> anyhow::Result<Option<Prediction>>;
}

/// Process-lifetime prediction list.
#[derive(Clone, Default)]
pub struct InMemoryPredictionRepo {
    inner: Arc<Mutex<Vec<Prediction>>>,
}

impl InMemoryPredictionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `seed` (kept in order).
    pub fn with_seed(seed: Vec<Prediction>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(seed)),
        }
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepo {
    async fn insert(&self, prediction: Prediction) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        tracing::debug!(
            id = %prediction.id,
            crypto = %prediction.crypto_id,
            total = inner.len() + 1,
            "Prediction store: inserted"
        );
        inner.insert(0, prediction);
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<Prediction>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Prediction>> {
        let inner = self.inner.lock().await;
        Ok(inner.iter().find(|p| p.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: PredictionStatus,
    ) -> anyhow::Result<Option<Prediction>> {
        let mut inner = self.inner.lock().await;
        let Some(prediction) = inner.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let old = prediction.status;
        prediction.status = status;
        tracing::debug!(
            id,
            from = %old,
            to = %status,
            "Prediction store: status updated"
        );
        Ok(Some(prediction.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_predictions;

    #[tokio::test]
    async fn test_insert_goes_to_head() {
        let repo = InMemoryPredictionRepo::with_seed(seed_predictions());
        let mut newest = seed_predictions().remove(2);
        newest.id = "pred-new".into();

        repo.insert(newest).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 7);
        assert_eq!(all[0].id, "pred-new");
        assert_eq!(all[1].id, "pred-001");
    }

    #[tokio::test]
    async fn test_list_is_a_snapshot() {
        let repo = InMemoryPredictionRepo::with_seed(seed_predictions());
        let mut snapshot = repo.list().await.unwrap();
        snapshot.clear();

        assert_eq!(repo.list().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = InMemoryPredictionRepo::with_seed(seed_predictions());

        let updated = repo
            .update_status("pred-002", PredictionStatus::Verified)
            .await
            .unwrap()
            .expect("pred-002 is seeded");
        assert_eq!(updated.status, PredictionStatus::Verified);

        let stored = repo.get("pred-002").await.unwrap().unwrap();
        assert_eq!(stored.status, PredictionStatus::Verified);

        assert!(repo
            .update_status("missing", PredictionStatus::Verified)
            .await
            .unwrap()
            .is_none());
    }
}
