mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use predictchain::api::router::create_router;
use predictchain::api::ws_types::WsMessage;
use predictchain::wallet::{ProviderEvent, WalletProvider};

use common::{build_test_app, build_test_state, send, ScriptedWallet};

const ACCOUNT: &str = "0x9f8e7d6c5b4a39281706f5e4d3c2b1a098765432";
const OTHER: &str = "0x1234567890abcdef1234567890abcdef12345678";

#[tokio::test]
async fn test_connect_without_provider() {
    let (app, state) = build_test_app();
    let mut rx = state.notifier.subscribe();

    let (status, json) = send(&app, "POST", "/api/wallet/connect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["outcome"], "provider_unavailable");
    assert_eq!(json["data"]["wallet"]["is_connected"], false);

    match rx.try_recv().unwrap() {
        WsMessage::Notification(n) => assert_eq!(n.title, "Wallet Not Found"),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_switches_to_target_chain() {
    let wallet = ScriptedWallet::new(ACCOUNT, "0x89");
    let state = build_test_state(Some(wallet.clone() as Arc<dyn WalletProvider>));
    let app = create_router(state.clone());

    let (status, json) = send(&app, "POST", "/api/wallet/connect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["outcome"], "connected");
    assert_eq!(json["data"]["wallet"]["account"], ACCOUNT);
    assert_eq!(json["data"]["wallet"]["chain_id"], "0x1");

    let (_, json) = send(&app, "GET", "/api/wallet", None).await;
    assert_eq!(json["data"]["is_connected"], true);

    let (_, json) = send(&app, "POST", "/api/wallet/disconnect", None).await;
    assert_eq!(json["data"]["is_connected"], false);
}

#[tokio::test]
async fn test_restore_session_and_account_events() {
    let wallet = ScriptedWallet::new(ACCOUNT, "0x1");
    let state = build_test_state(Some(wallet.clone() as Arc<dyn WalletProvider>));

    let restored = state.wallet.restore_session().await.unwrap();
    assert!(restored.is_connected);

    let listener = state.wallet.clone().spawn_event_listener().unwrap();

    wallet.emit(ProviderEvent::AccountsChanged(vec![OTHER.into()]));
    let mut switched = false;
    for _ in 0..50 {
        if state.wallet.account().await.as_deref() == Some(OTHER) {
            switched = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(switched);

    wallet.emit(ProviderEvent::AccountsChanged(vec![]));
    let mut disconnected = false;
    for _ in 0..50 {
        if !state.wallet.state().await.is_connected {
            disconnected = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(disconnected);

    listener.abort();
}

#[tokio::test]
async fn test_deploy_contract_requires_wallet() {
    let wallet = ScriptedWallet::new(ACCOUNT, "0x1");
    let state = build_test_state(Some(wallet as Arc<dyn WalletProvider>));
    let app = create_router(state);

    let params = json!({
        "template": "erc20",
        "name": "Prediction Token",
        "symbol": "PRED",
        "initial_supply": 1000000
    });

    let (status, json) = send(&app, "POST", "/api/contracts/deploy", Some(params.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Please connect your wallet first");

    send(&app, "POST", "/api/wallet/connect", None).await;

    let (status, json) = send(&app, "POST", "/api/contracts/deploy", Some(params)).await;
    assert_eq!(status, StatusCode::CREATED);
    let address = json["data"]["address"].as_str().unwrap().to_string();
    assert!(address.starts_with("0x"));
    assert_eq!(address.len(), 42);

    let (_, latest) = send(&app, "GET", "/api/contracts/latest", None).await;
    assert_eq!(latest["data"]["address"], address.as_str());
}

#[tokio::test]
async fn test_deploy_rejects_short_custom_code() {
    let wallet = ScriptedWallet::new(ACCOUNT, "0x1");
    let state = build_test_state(Some(wallet as Arc<dyn WalletProvider>));
    let app = create_router(state);
    send(&app, "POST", "/api/wallet/connect", None).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/contracts/deploy",
        Some(json!({ "template": "custom", "custom_code": "x = 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
