use tokio_tungstenite::tungstenite;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The server answered with GraphQL errors; one message per error.
    #[error("graphql error: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("response has no data for `{0}`")]
    MissingData(&'static str),
}

impl ClientError {
    /// True when the server rejected the caller's session.
    pub fn is_not_authorized(&self) -> bool {
        matches!(self, Self::GraphQl(messages) if messages.iter().any(|m| m == "Not authorized"))
    }
}
