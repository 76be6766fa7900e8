use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractTemplate {
    Erc20,
    Erc721,
    Erc1155,
    Custom,
}

impl ContractTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractTemplate::Erc20 => "erc20",
            ContractTemplate::Erc721 => "erc721",
            ContractTemplate::Erc1155 => "erc1155",
            ContractTemplate::Custom => "custom",
        }
    }

    /// Token templates need a name and a symbol.
    pub fn is_token(&self) -> bool {
        !matches!(self, ContractTemplate::Custom)
    }
}

impl fmt::Display for ContractTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployParams {
    pub template: ContractTemplate,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub initial_supply: Option<i64>,
    #[serde(default)]
    pub custom_code: Option<String>,
}

/// Result of a (simulated) deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployedContract {
    pub address: String,
    pub template: ContractTemplate,
    pub deployer: String,
    pub deployed_at: chrono::DateTime<chrono::Utc>,
}
