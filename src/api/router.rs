use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes: no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/api/catalog/cryptocurrencies", get(handlers::catalog::cryptocurrencies))
        .route("/api/catalog/timeframes", get(handlers::catalog::timeframes));

    // Protected API routes: require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Predictions
        .route("/api/predictions", get(handlers::predictions::list).post(handlers::predictions::create))
        .route("/api/predictions/verify", post(handlers::predictions::verify))
        .route("/api/predictions/:id", get(handlers::predictions::detail))
        // Market data
        .route("/api/markets/:crypto/price", get(handlers::markets::price))
        .route("/api/markets/:crypto/history", get(handlers::markets::history))
        // NFTs
        .route("/api/nfts/search", get(handlers::nfts::search))
        .route(
            "/api/nft-predictions",
            get(handlers::nfts::list_predictions)
                .post(handlers::nfts::create_prediction)
                .delete(handlers::nfts::clear_predictions),
        )
        // Wallet
        .route("/api/wallet", get(handlers::wallet::state))
        .route("/api/wallet/connect", post(handlers::wallet::connect))
        .route("/api/wallet/disconnect", post(handlers::wallet::disconnect))
        // Contracts
        .route("/api/contracts/deploy", post(handlers::contracts::deploy))
        .route("/api/contracts/latest", get(handlers::contracts::latest))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
