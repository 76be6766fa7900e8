use std::sync::Arc;

use crate::models::{DeployParams, DeployedContract};
use crate::services::contract_service::{ContractService, DeployError};
use crate::services::notifier::{Notification, Notifier};
use crate::wallet::WalletConnector;

/// Deployment mutation bound to the current wallet session.
pub struct ContractQueries {
    service: Arc<ContractService>,
    wallet: Arc<WalletConnector>,
    notifier: Notifier,
}

impl ContractQueries {
    pub fn new(service: Arc<ContractService>, wallet: Arc<WalletConnector>, notifier: Notifier) -> Self {
        Self {
            service,
            wallet,
            notifier,
        }
    }

    pub async fn deploy_contract(&self, params: &DeployParams) -> Result<DeployedContract, DeployError> {
        let account = self.wallet.account().await;

        match self.service.deploy(account.as_deref(), params).await {
            Ok(deployed) => {
                self.notifier.notify(Notification::info(
                    "Contract Deployed",
                    format!("{} contract deployed at {}", deployed.template, deployed.address),
                ));
                Ok(deployed)
            }
            Err(e) => {
                tracing::warn!(error = %e, template = %params.template, "Contract deployment rejected");
                self.notifier
                    .notify(Notification::error("Deployment Failed", e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn last_deployed(&self) -> Option<DeployedContract> {
        self.service.last_deployed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ws_types::WsMessage;
    use crate::models::ContractTemplate;
    use crate::services::simulator::LatencyProfile;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn test_deploy_requires_connected_wallet() {
        let (tx, mut rx) = broadcast::channel(16);
        let notifier = Notifier::new(tx);
        let wallet = Arc::new(WalletConnector::new(None, "0x1", notifier.clone()));
        let queries = ContractQueries::new(
            Arc::new(ContractService::new(LatencyProfile::none())),
            wallet,
            notifier,
        );

        let params = DeployParams {
            template: ContractTemplate::Erc721,
            name: Some("Art".into()),
            symbol: Some("ART".into()),
            initial_supply: None,
            custom_code: None,
        };
        assert_eq!(
            queries.deploy_contract(&params).await,
            Err(DeployError::NotConnected)
        );
        assert!(queries.last_deployed().await.is_none());

        match rx.try_recv().unwrap() {
            WsMessage::Notification(n) => assert_eq!(n.title, "Deployment Failed"),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
