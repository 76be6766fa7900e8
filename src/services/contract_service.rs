use chrono::Utc;
use metrics::counter;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{ContractTemplate, DeployParams, DeployedContract};

use super::digest::sha256_hex;
use super::simulator::{self, LatencyProfile};

const MIN_CUSTOM_CODE_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeployError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Invalid account address: {0}")]
    InvalidAccount(String),

    #[error("Token name is required for {0} contracts")]
    MissingName(ContractTemplate),

    #[error("Token symbol is required for {0} contracts")]
    MissingSymbol(ContractTemplate),

    #[error("Initial supply must not be negative")]
    NegativeSupply,

    #[error("Custom contract code must be at least 10 characters")]
    CodeTooShort,
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Check deployment parameters before anything is "sent".
pub fn validate(account: Option<&str>, params: &DeployParams) -> Result<(), DeployError> {
    let account = account.ok_or(DeployError::NotConnected)?;
    if !account.starts_with("0x") {
        return Err(DeployError::InvalidAccount(account.to_string()));
    }

    if params.template.is_token() {
        if !non_blank(&params.name) {
            return Err(DeployError::MissingName(params.template));
        }
        if !non_blank(&params.symbol) {
            return Err(DeployError::MissingSymbol(params.template));
        }
    }

    match params.template {
        ContractTemplate::Erc20 if params.initial_supply.is_some_and(|s| s < 0) => {
            Err(DeployError::NegativeSupply)
        }
        ContractTemplate::Custom
            if params
                .custom_code
                .as_deref()
                .map_or(0, |code| code.trim().len())
                < MIN_CUSTOM_CODE_LEN =>
        {
            Err(DeployError::CodeTooShort)
        }
        _ => Ok(()),
    }
}

/// `0x` + first 20 bytes of SHA-256 over the deployment fingerprint.
pub fn contract_address(account: &str, params: &DeployParams, millis: i64) -> String {
    let fingerprint = format!(
        "{}-{}-{}-{}-{}",
        account,
        params.template,
        params.name.as_deref().unwrap_or_default(),
        params.symbol.as_deref().unwrap_or_default(),
        millis
    );
    let digest = sha256_hex(&fingerprint);
    format!("0x{}", &digest[..40])
}

/// Simulated deployments. Nothing is broadcast to a chain.
pub struct ContractService {
    latency: LatencyProfile,
    last: Mutex<Option<DeployedContract>>,
}

impl ContractService {
    pub fn new(latency: LatencyProfile) -> Self {
        Self {
            latency,
            last: Mutex::new(None),
        }
    }

    pub async fn deploy(
        &self,
        account: Option<&str>,
        params: &DeployParams,
    ) -> Result<DeployedContract, DeployError> {
        if let Err(e) = validate(account, params) {
            counter!("contract_deployments_total", "result" => "rejected").increment(1);
            return Err(e);
        }
        let account = account.ok_or(DeployError::NotConnected)?;

        simulator::simulate_delay(self.latency.contract_deploy).await;

        let now = Utc::now();
        let deployed = DeployedContract {
            address: contract_address(account, params, now.timestamp_millis()),
            template: params.template,
            deployer: account.to_string(),
            deployed_at: now,
        };

        tracing::info!(
            template = %deployed.template,
            address = %deployed.address,
            deployer = %deployed.deployer,
            "Contract deployed"
        );
        counter!("contract_deployments_total", "result" => "deployed").increment(1);

        *self.last.lock().await = Some(deployed.clone());
        Ok(deployed)
    }

    pub async fn last_deployed(&self) -> Option<DeployedContract> {
        self.last.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "0x1111222233334444555566667777888899990000";

    fn erc20(name: Option<&str>, symbol: Option<&str>, supply: Option<i64>) -> DeployParams {
        DeployParams {
            template: ContractTemplate::Erc20,
            name: name.map(String::from),
            symbol: symbol.map(String::from),
            initial_supply: supply,
            custom_code: None,
        }
    }

    #[test]
    fn test_validation_rules() {
        let ok = erc20(Some("Token"), Some("TKN"), Some(1_000));
        assert_eq!(validate(Some(ACCOUNT), &ok), Ok(()));
        assert_eq!(validate(None, &ok), Err(DeployError::NotConnected));
        assert!(matches!(
            validate(Some("1111"), &ok),
            Err(DeployError::InvalidAccount(_))
        ));
        assert_eq!(
            validate(Some(ACCOUNT), &erc20(Some("  "), Some("TKN"), None)),
            Err(DeployError::MissingName(ContractTemplate::Erc20))
        );
        assert_eq!(
            validate(Some(ACCOUNT), &erc20(Some("Token"), None, None)),
            Err(DeployError::MissingSymbol(ContractTemplate::Erc20))
        );
        assert_eq!(
            validate(Some(ACCOUNT), &erc20(Some("Token"), Some("TKN"), Some(-1))),
            Err(DeployError::NegativeSupply)
        );
    }

    #[test]
    fn test_custom_code_length() {
        let mut params = DeployParams {
            template: ContractTemplate::Custom,
            name: None,
            symbol: None,
            initial_supply: None,
            custom_code: Some("   short    ".into()),
        };
        assert_eq!(validate(Some(ACCOUNT), &params), Err(DeployError::CodeTooShort));

        params.custom_code = Some("contract Foo {}".into());
        assert_eq!(validate(Some(ACCOUNT), &params), Ok(()));
    }

    #[test]
    fn test_address_is_deterministic() {
        let params = erc20(Some("Token"), Some("TKN"), None);
        let a = contract_address(ACCOUNT, &params, 1_700_000_000_000);
        let b = contract_address(ACCOUNT, &params, 1_700_000_000_000);
        let c = contract_address(ACCOUNT, &params, 1_700_000_000_001);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 42);
        assert!(a.starts_with("0x"));
    }

    #[tokio::test]
    async fn test_deploy_remembers_last_address() {
        let svc = ContractService::new(LatencyProfile::none());
        assert!(svc.last_deployed().await.is_none());

        let rejected = svc.deploy(Some(ACCOUNT), &erc20(None, None, None)).await;
        assert!(rejected.is_err());
        assert!(svc.last_deployed().await.is_none());

        let deployed = svc
            .deploy(Some(ACCOUNT), &erc20(Some("Token"), Some("TKN"), Some(10)))
            .await
            .unwrap();
        assert_eq!(svc.last_deployed().await, Some(deployed));
    }
}
