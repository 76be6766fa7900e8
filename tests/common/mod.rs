use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tower::ServiceExt;

use predictchain::api::router::create_router;
use predictchain::config::AppConfig;
use predictchain::wallet::{ProviderError, ProviderEvent, WalletProvider};
use predictchain::AppState;

/// Mock-mode state with no latency and the given wallet provider.
#[allow(dead_code)]
pub fn build_test_state(provider: Option<Arc<dyn WalletProvider>>) -> AppState {
    let metrics_handle = predictchain::metrics::init_metrics().expect("metrics recorder");
    AppState::build(AppConfig::for_mock(), reqwest::Client::new(), provider, metrics_handle)
}

#[allow(dead_code)]
pub fn build_test_app() -> (axum::Router, AppState) {
    let state = build_test_state(None);
    (create_router(state.clone()), state)
}

/// Send a request and decode the JSON body (Null for empty bodies).
#[allow(dead_code)]
pub async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// In-process wallet answering the handful of methods the connector uses.
#[allow(dead_code)]
pub struct ScriptedWallet {
    pub accounts: Mutex<Vec<String>>,
    pub chain_id: Mutex<String>,
    pub events: broadcast::Sender<ProviderEvent>,
}

#[allow(dead_code)]
impl ScriptedWallet {
    pub fn new(account: &str, chain_id: &str) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(vec![account.to_string()]),
            chain_id: Mutex::new(chain_id.to_string()),
            events,
        })
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        match method {
            "eth_accounts" | "eth_requestAccounts" => Ok(json!(*self.accounts.lock().unwrap())),
            "eth_chainId" => Ok(json!(*self.chain_id.lock().unwrap())),
            "wallet_switchEthereumChain" => {
                let target = params
                    .first()
                    .and_then(|p| p.get("chainId"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                *self.chain_id.lock().unwrap() = target;
                Ok(Value::Null)
            }
            other => Err(ProviderError::Rpc {
                code: -32601,
                message: format!("method {other} not supported"),
            }),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
