use std::sync::Arc;

use serde_json::json;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::api::ws_types::{ReloadData, WsMessage};
use crate::models::WalletState;
use crate::services::notifier::{self, Notification, Notifier};

use super::provider::{parse_accounts, parse_chain_id, ProviderError, ProviderEvent, WalletProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected { account: String, chain_id: String },
}

impl ConnectionState {
    pub fn to_wallet_state(&self) -> WalletState {
        match self {
            ConnectionState::Disconnected => WalletState::disconnected(),
            ConnectionState::Connected { account, chain_id } => {
                WalletState::connected(account.clone(), chain_id.clone())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(WalletState),
    ProviderUnavailable,
    Failed(String),
}

/// Tracks the user's wallet session and reacts to provider events.
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
    target_chain_id: String,
    state: RwLock<ConnectionState>,
    notifier: Notifier,
}

fn same_chain(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl WalletConnector {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        target_chain_id: impl Into<String>,
        notifier: Notifier,
    ) -> Self {
        Self {
            provider,
            target_chain_id: target_chain_id.into(),
            state: RwLock::new(ConnectionState::Disconnected),
            notifier,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn target_chain_id(&self) -> &str {
        &self.target_chain_id
    }

    pub async fn state(&self) -> WalletState {
        self.state.read().await.to_wallet_state()
    }

    /// Connected account, if any.
    pub async fn account(&self) -> Option<String> {
        match &*self.state.read().await {
            ConnectionState::Connected { account, .. } => Some(account.clone()),
            ConnectionState::Disconnected => None,
        }
    }

    async fn set_state(&self, next: ConnectionState) -> WalletState {
        let snapshot = next.to_wallet_state();
        *self.state.write().await = next;
        self.notifier.publish(WsMessage::WalletUpdate(snapshot.clone()));
        snapshot
    }

    /// Pick up an already-authorized session without prompting the user.
    pub async fn restore_session(&self) -> Result<WalletState, ProviderError> {
        let Some(provider) = &self.provider else {
            return Ok(self.state().await);
        };

        let accounts = parse_accounts(&provider.request("eth_accounts", vec![]).await?)?;
        let Some(account) = accounts.into_iter().next() else {
            return Ok(self.state().await);
        };
        let chain_id = parse_chain_id(&provider.request("eth_chainId", vec![]).await?)?;

        tracing::info!(account = %account, chain_id = %chain_id, "Wallet session restored");
        Ok(self
            .set_state(ConnectionState::Connected { account, chain_id })
            .await)
    }

    pub async fn connect(&self) -> ConnectOutcome {
        let Some(provider) = self.provider.clone() else {
            tracing::warn!("Connect requested but no wallet provider is configured");
            self.notifier.notify(Notification::error(
                "Wallet Not Found",
                "Please install MetaMask or another Ethereum wallet.",
            ));
            return ConnectOutcome::ProviderUnavailable;
        };

        match self.try_connect(provider.as_ref()).await {
            Ok(state) => ConnectOutcome::Connected(state),
            Err(e) => {
                tracing::error!(error = %e, "Wallet connection failed");
                self.notifier.notify(Notification::error(
                    "Connection Failed",
                    "Failed to connect to your wallet. Please try again.",
                ));
                ConnectOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_connect(&self, provider: &dyn WalletProvider) -> Result<WalletState, ProviderError> {
        let accounts = parse_accounts(&provider.request("eth_requestAccounts", vec![]).await?)?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("wallet returned no accounts".into()))?;
        let mut chain_id = parse_chain_id(&provider.request("eth_chainId", vec![]).await?)?;

        if !same_chain(&chain_id, &self.target_chain_id) {
            let params = vec![json!({ "chainId": self.target_chain_id })];
            match provider.request("wallet_switchEthereumChain", params).await {
                Ok(_) => {
                    tracing::info!(from = %chain_id, to = %self.target_chain_id, "Switched wallet network");
                    chain_id = self.target_chain_id.clone();
                }
                Err(e) => {
                    tracing::warn!(error = %e, chain_id = %chain_id, "Network switch failed");
                    self.notifier
                        .notify(notifier::network_error(&self.target_chain_id));
                }
            }
        }

        let state = self
            .set_state(ConnectionState::Connected {
                account: account.clone(),
                chain_id,
            })
            .await;
        self.notifier.notify(notifier::wallet_connected(&account));
        Ok(state)
    }

    /// Forget the session locally. Wallets offer no revoke call.
    pub async fn disconnect(&self) -> WalletState {
        let state = self.set_state(ConnectionState::Disconnected).await;
        self.notifier.notify(Notification::info(
            "Wallet Disconnected",
            "You have successfully disconnected your wallet.",
        ));
        state
    }

    /// Apply a provider event to the connection state.
    ///
    /// - `accountsChanged([])` disconnects.
    /// - `accountsChanged([a, ..])` switches to `a` only while connected. While
    ///   disconnected the account is not recorded; the next `connect` reads it.
    /// - `chainChanged(id)` updates the chain while connected and always
    ///   broadcasts a reload.
    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    let connected = *self.state.read().await != ConnectionState::Disconnected;
                    if connected {
                        self.set_state(ConnectionState::Disconnected).await;
                        self.notifier.notify(Notification::info(
                            "Wallet Disconnected",
                            "Your wallet has been disconnected.",
                        ));
                    }
                }
                Some(account) => {
                    let current = self.state.read().await.clone();
                    match current {
                        ConnectionState::Connected {
                            account: previous,
                            chain_id,
                        } if previous != account => {
                            self.set_state(ConnectionState::Connected {
                                account: account.clone(),
                                chain_id,
                            })
                            .await;
                            self.notifier.notify(notifier::account_changed(&account));
                        }
                        ConnectionState::Connected { .. } => {}
                        ConnectionState::Disconnected => {
                            tracing::debug!("Ignoring accountsChanged while disconnected");
                        }
                    }
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                let current = self.state.read().await.clone();
                if let ConnectionState::Connected { account, .. } = current {
                    self.set_state(ConnectionState::Connected {
                        account,
                        chain_id: chain_id.clone(),
                    })
                    .await;
                }
                tracing::info!(chain_id = %chain_id, "Wallet network changed");
                self.notifier.notify(Notification::info(
                    "Network Changed",
                    "The blockchain network has been changed.",
                ));
                self.notifier.publish(WsMessage::Reload(ReloadData {
                    reason: "chainChanged".into(),
                    chain_id,
                }));
            }
        }
    }

    /// Forward provider events into the connector. Abort the handle to
    /// unsubscribe.
    pub fn spawn_event_listener(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let mut rx = self.provider.as_ref()?.subscribe();
        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Wallet event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::info!("Wallet event listener stopped");
        }))
    }
}
