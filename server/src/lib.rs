//! Server library - exposes the modules used by the binary and the tests

pub mod core;
pub mod dtos;
pub mod entities;
pub mod graphql;
pub mod pubsub;
pub mod repositories;
pub mod services;

pub use core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use graphql::handlers::{GRAPHQL_PATH, SUBSCRIPTIONS_PATH, graphiql, graphql_handler, graphql_ws_handler};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let schema = graphql::schema(state.clone());

    Router::new()
        .route("/", get(services::root))
        .route("/health", get(services::health))
        .route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
        .route(SUBSCRIPTIONS_PATH, get(graphql_ws_handler))
        .layer(Extension(schema))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the web client: one origin, cookies allowed.
pub fn cors_layer(client_origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(client_origin)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
