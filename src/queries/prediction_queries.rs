use std::convert::Infallible;
use std::sync::Arc;

use crate::api::ws_types::{VerifiedData, WsMessage};
use crate::models::{Prediction, PredictionRequest, Sourced, VerificationResult};
use crate::services::notifier::{self, Notification, Notifier};
use crate::services::prediction_service::{PredictionError, PredictionService};

use super::cache::{QueryCache, QueryKey};

pub const PREDICTIONS_KEY: &str = "predictions";

fn predictions_key() -> QueryKey {
    QueryKey::new([PREDICTIONS_KEY])
}

/// Cached reads and notifying mutations over [`PredictionService`].
pub struct PredictionQueries {
    service: Arc<PredictionService>,
    cache: Arc<QueryCache>,
    notifier: Notifier,
}

impl PredictionQueries {
    pub fn new(service: Arc<PredictionService>, cache: Arc<QueryCache>, notifier: Notifier) -> Self {
        Self {
            service,
            cache,
            notifier,
        }
    }

    pub fn service(&self) -> &PredictionService {
        &self.service
    }

    pub async fn get_predictions(&self) -> Sourced<Vec<Prediction>> {
        let service = self.service.clone();
        let result: Result<_, Infallible> = self
            .cache
            .fetch(predictions_key(), || async move {
                Ok(service.fetch_predictions().await)
            })
            .await;
        match result {
            Ok(list) => list,
            Err(never) => match never {},
        }
    }

    /// `Ok(None)` when the id is blank and the query stays disabled.
    pub async fn get_prediction_by_id(&self, id: &str) -> Result<Option<Prediction>, PredictionError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let service = self.service.clone();
        let owned = id.to_string();
        self.cache
            .fetch(QueryKey::new([PREDICTIONS_KEY, id]), || async move {
                service.fetch_prediction_by_id(&owned).await
            })
            .await
            .map(Some)
    }

    /// Parse the raw request, create the prediction and refresh listings.
    pub async fn create_prediction(
        &self,
        crypto_id: &str,
        timeframe: &str,
    ) -> Result<Sourced<Prediction>, PredictionError> {
        let request = match parse_request(crypto_id, timeframe) {
            Ok(request) => request,
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Error Creating Prediction", e.to_string()));
                return Err(e);
            }
        };

        let created = self.service.request_prediction(request).await;
        self.cache.invalidate(&predictions_key()).await;

        self.notifier.notify(notifier::prediction_created(created.get()));
        self.notifier
            .publish(WsMessage::PredictionCreated(created.get().clone()));
        Ok(created)
    }

    pub async fn verify_prediction_hash(
        &self,
        id: &str,
        hash: &str,
    ) -> Result<VerificationResult, PredictionError> {
        let result = match self.service.verify_prediction(id, hash).await {
            Ok(result) => result,
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Verification Failed", e.to_string()));
                return Err(e);
            }
        };

        if result.is_verified {
            self.cache.invalidate(&predictions_key()).await;
            self.notifier
                .notify(Notification::info("Prediction Verified", result.message.clone()));
        } else {
            self.notifier
                .notify(Notification::error("Verification Failed", result.message.clone()));
        }
        self.notifier.publish(WsMessage::PredictionVerified(VerifiedData {
            id: id.to_string(),
            is_verified: result.is_verified,
        }));

        Ok(result)
    }
}

fn parse_request(crypto_id: &str, timeframe: &str) -> Result<PredictionRequest, PredictionError> {
    Ok(PredictionRequest {
        crypto_id: crypto_id.parse().map_err(PredictionError::InvalidRequest)?,
        timeframe: timeframe.parse().map_err(PredictionError::InvalidRequest)?,
    })
}
