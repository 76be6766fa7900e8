use std::convert::Infallible;
use std::sync::Arc;

use crate::api::ws_types::WsMessage;
use crate::models::{Nft, NftPrediction, NftSearchRequest, Sourced, TimeFrame};
use crate::services::nft_service::{NftError, NftService};
use crate::services::notifier::{self, Notification, Notifier};

use super::cache::{QueryCache, QueryKey};

pub const NFT_SEARCH_KEY: &str = "nftSearch";
pub const NFT_PREDICTIONS_KEY: &str = "nftPredictions";

/// Searches shorter than this are not executed.
pub const MIN_SEARCH_LEN: usize = 2;

fn predictions_key() -> QueryKey {
    QueryKey::new([NFT_PREDICTIONS_KEY])
}

pub struct NftQueries {
    service: Arc<NftService>,
    cache: Arc<QueryCache>,
    notifier: Notifier,
}

impl NftQueries {
    pub fn new(service: Arc<NftService>, cache: Arc<QueryCache>, notifier: Notifier) -> Self {
        Self {
            service,
            cache,
            notifier,
        }
    }

    /// `None` when the query is too short to run.
    pub async fn search_nfts(&self, query: &str, blockchain: Option<&str>) -> Option<Vec<Nft>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return None;
        }

        let request = NftSearchRequest {
            query: query.to_string(),
            blockchain: blockchain
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from),
        };
        let key = QueryKey::new([
            NFT_SEARCH_KEY,
            query,
            request.blockchain.as_deref().unwrap_or_default(),
        ]);

        let service = self.service.clone();
        let result: Result<_, Infallible> = self
            .cache
            .fetch(key, || async move { Ok(service.search_nfts(&request).await) })
            .await;
        match result {
            Ok(found) => Some(found),
            Err(never) => match never {},
        }
    }

    pub async fn get_nft_predictions(&self) -> Vec<NftPrediction> {
        let service = self.service.clone();
        let result: Result<_, Infallible> = self
            .cache
            .fetch(predictions_key(), || async move { Ok(service.nft_predictions().await) })
            .await;
        match result {
            Ok(list) => list,
            Err(never) => match never {},
        }
    }

    pub async fn create_nft_prediction(
        &self,
        nft_id: &str,
        timeframe: &str,
    ) -> Result<Sourced<NftPrediction>, NftError> {
        let outcome = match timeframe.parse::<TimeFrame>() {
            Ok(timeframe) => self.service.generate_nft_prediction(nft_id, timeframe).await,
            Err(e) => Err(NftError::Validation(e)),
        };

        match outcome {
            Ok(created) => {
                self.cache.invalidate(&predictions_key()).await;
                self.notifier
                    .notify(notifier::nft_prediction_created(created.get()));
                self.notifier
                    .publish(WsMessage::NftPredictionCreated(created.get().clone()));
                Ok(created)
            }
            Err(e) => {
                self.notifier.notify(Notification::error(
                    "Error Creating NFT Prediction",
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    pub async fn clear_nft_predictions(&self) {
        self.service.clear_nft_predictions().await;
        self.cache.invalidate(&predictions_key()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::nft_catalog;
    use crate::db::NftPredictionStore;
    use crate::services::prediction_service::ServiceMode;
    use crate::services::simulator::LatencyProfile;
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn queries() -> (NftQueries, broadcast::Receiver<WsMessage>) {
        let (tx, rx) = broadcast::channel(64);
        let service = Arc::new(NftService::new(
            ServiceMode::Mock,
            nft_catalog(),
            NftPredictionStore::new(),
            LatencyProfile::none(),
        ));
        let cache = Arc::new(QueryCache::new(Duration::from_secs(300)));
        (NftQueries::new(service, cache, Notifier::new(tx)), rx)
    }

    #[tokio::test]
    async fn test_short_search_is_disabled() {
        let (q, _rx) = queries();
        assert_eq!(q.search_nfts("", None).await, None);
        assert_eq!(q.search_nfts(" a ", None).await, None);

        let found = q.search_nfts("ape", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].collection, "Bored Ape Yacht Club");
    }

    #[tokio::test]
    async fn test_blockchain_filter() {
        let (q, _rx) = queries();
        let solana = q.search_nfts("o", Some("solana")).await;
        assert_eq!(solana, None);

        let solana = q.search_nfts("de", Some("Solana")).await.unwrap();
        assert!(solana.iter().all(|n| n.blockchain == "Solana"));
        assert!(!solana.is_empty());
    }

    #[tokio::test]
    async fn test_create_refreshes_listing() {
        let (q, mut rx) = queries();
        assert!(q.get_nft_predictions().await.is_empty());

        let created = q.create_nft_prediction("nft-4", "30d").await.unwrap();
        let listed = q.get_nft_predictions().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.get().id);

        let mut saw_created = false;
        while let Ok(msg) = rx.try_recv() {
            if let WsMessage::Notification(n) = msg {
                assert_eq!(n.title, "NFT Prediction Created");
                saw_created = true;
            }
        }
        assert!(saw_created);

        q.clear_nft_predictions().await;
        assert!(q.get_nft_predictions().await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_timeframe_is_validation_error() {
        let (q, _rx) = queries();
        assert!(matches!(
            q.create_nft_prediction("nft-1", "2w").await,
            Err(NftError::Validation(_))
        ));
    }
}
