use super::AppSchema;
use crate::core::AppState;
use crate::core::auth::{session_from_headers, session_from_token, token_from_connection_params, token_from_headers};
use async_graphql::Data;
use async_graphql::http::{ALL_WEBSOCKET_PROTOCOLS, GraphiQLSource};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    Extension,
    extract::{State, WebSocketUpgrade},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

pub const GRAPHQL_PATH: &str = "/graphql";
pub const SUBSCRIPTIONS_PATH: &str = "/graphql/subscriptions";

/// Executes a query or mutation. The session comes from the `token` cookie or
/// a bearer header; requests without one still run and fail per resolver.
pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    Extension(schema): Extension<AppSchema>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut req = req.into_inner();
    if let Some(session) = session_from_headers(&headers, &state.jwt_secret) {
        req = req.data(session);
    }
    schema.execute(req).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint(GRAPHQL_PATH)
            .subscription_endpoint(SUBSCRIPTIONS_PATH)
            .finish(),
    )
}

/// GraphQL over WebSocket (`graphql-transport-ws` and the legacy `graphql-ws`).
///
/// The session is resolved once at `connection_init`: a token in the init
/// payload wins over the upgrade request's cookie or bearer header.
pub async fn graphql_ws_handler(
    State(state): State<Arc<AppState>>,
    Extension(schema): Extension<AppSchema>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
) -> Response {
    let header_token = token_from_headers(&headers);

    upgrade
        .protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |params| async move {
                    let mut data = Data::default();
                    let token = token_from_connection_params(&params).or(header_token);
                    match token.and_then(|t| session_from_token(&t, &state.jwt_secret)) {
                        Some(session) => {
                            debug!(user_id = %session.user_id, "WebSocket connection authenticated");
                            data.insert(session);
                        }
                        None => debug!("WebSocket connection without session"),
                    }
                    Ok(data)
                })
                .serve()
        })
}
