//! Polls backend: create polls, vote on their choices and read the results.
//!
//! Every poll belongs to the user who created it; only that user may edit,
//! delete or see the tallies. Authentication is passkey based and sessions
//! travel in a signed cookie.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

pub mod controllers;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use db::{connection, memory_store::MemoryStore, mongo_store::MongoStore};
use state::AppState;
use utils::config::{Config, StoreKind};
use utils::error::AppResult;

/// Builds the state for the configured backend.
pub async fn build_state(config: Config) -> AppResult<AppState> {
    let webauthn = utils::webauthn::init_webauthn(&config)?;
    let config = Arc::new(config);

    let state = match config.store {
        StoreKind::Mongo => {
            let database = connection::init_db(&config).await?;
            let store = Arc::new(MongoStore::new(database));
            AppState::new(store.clone(), store, webauthn, config)
        }
        StoreKind::Memory => {
            warn!("Using the in-memory store, data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            AppState::new(store.clone(), store, webauthn, config)
        }
    };

    Ok(state)
}

pub fn app(state: AppState) -> Router {
    let protected = routes::poll_routes::poll_routes()
        .merge(routes::auth_routes::profile_routes())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::jwt::require_session,
        ));

    Router::new()
        .route("/health", get(controllers::health::health))
        .merge(routes::poll_routes::public_poll_routes())
        .merge(routes::auth_routes::auth_routes())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::USER_AGENT,
            header::COOKIE,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(origin = %config.cors_origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}
