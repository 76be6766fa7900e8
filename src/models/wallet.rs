use serde::{Deserialize, Serialize};

/// Snapshot of the wallet connection as exposed to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub is_connected: bool,
    pub account: Option<String>,
    pub chain_id: Option<String>,
    /// Reserved; balances are not queried.
    pub balance: Option<String>,
}

impl WalletState {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(account: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            is_connected: true,
            account: Some(account.into()),
            chain_id: Some(chain_id.into()),
            balance: None,
        }
    }
}

/// Shorten an address to `0x1234...abcd` for display.
pub fn short_address(address: &str) -> String {
    if address.len() > 10 && address.is_ascii() {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0xAbCdEf0123456789aBcDeF0123456789abcdef01"),
            "0xAbCd...ef01"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }
}
