use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON-RPC response: {0}")]
    Parse(String),
}

/// Notifications a wallet pushes without being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}

/// An EIP-1193 style wallet: request/response calls plus pushed events.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Decode a `result` that must be an array of address strings.
pub fn parse_accounts(value: &Value) -> Result<Vec<String>, ProviderError> {
    value
        .as_array()
        .ok_or_else(|| ProviderError::Parse(format!("expected account list, got {value}")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(String::from)
                .ok_or_else(|| ProviderError::Parse(format!("non-string account: {v}")))
        })
        .collect()
}

pub fn parse_chain_id(value: &Value) -> Result<String, ProviderError> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| ProviderError::Parse(format!("expected chain id string, got {value}")))
}

/// Unwrap a JSON-RPC 2.0 response envelope.
fn unwrap_response(body: Value) -> Result<Value, ProviderError> {
    if let Some(err) = body.get("error") {
        return Err(ProviderError::Rpc {
            code: err.get("code").and_then(Value::as_i64).unwrap_or(-32603),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    body.get("result")
        .cloned()
        .ok_or_else(|| ProviderError::Parse(format!("response has neither result nor error: {body}")))
}

/// Wallet reached over HTTP JSON-RPC (a node or a wallet bridge).
///
/// HTTP has no push channel, so account and chain changes are detected by
/// [`JsonRpcProvider::spawn_poller`].
pub struct JsonRpcProvider {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    events: broadcast::Sender<ProviderEvent>,
}

impl JsonRpcProvider {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// Poll `eth_accounts` and `eth_chainId`, emitting events on change.
    pub fn spawn_poller(self: Arc<Self>, poll_interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            let mut last_accounts: Option<Vec<String>> = None;
            let mut last_chain: Option<String> = None;
            tracing::info!(
                url = %self.url,
                interval_secs = poll_interval.as_secs(),
                "Wallet poller started"
            );

            loop {
                ticker.tick().await;

                match self.request("eth_accounts", vec![]).await.and_then(|v| parse_accounts(&v)) {
                    Ok(accounts) => {
                        if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                            self.emit(ProviderEvent::AccountsChanged(accounts.clone()));
                        }
                        last_accounts = Some(accounts);
                    }
                    Err(e) => tracing::warn!(error = %e, "Wallet poller: eth_accounts failed"),
                }

                match self.request("eth_chainId", vec![]).await.and_then(|v| parse_chain_id(&v)) {
                    Ok(chain) => {
                        if last_chain.as_ref().is_some_and(|prev| *prev != chain) {
                            self.emit(ProviderEvent::ChainChanged(chain.clone()));
                        }
                        last_chain = Some(chain);
                    }
                    Err(e) => tracing::warn!(error = %e, "Wallet poller: eth_chainId failed"),
                }
            }
        })
    }

    fn emit(&self, event: ProviderEvent) {
        tracing::debug!(?event, "Wallet provider event");
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let body: Value = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_response(body)
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
