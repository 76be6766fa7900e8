pub mod connector;
pub mod provider;

pub use connector::{ConnectOutcome, ConnectionState, WalletConnector};
pub use provider::{JsonRpcProvider, ProviderError, ProviderEvent, WalletProvider};
