//! HTTP execution of queries and mutations, and GraphQL subscriptions over
//! WebSocket (`graphql-transport-ws`).

use crate::error::ClientError;
use crate::models::{
    AuthPayload, Conversation, CreateConversationResponse, CreateUsernameResponse, Message, User,
};
use crate::operations::{self, GraphQlRequest};
use futures_util::{SinkExt, Stream, StreamExt, stream};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SUBSCRIPTION_ID: &str = "1";

#[derive(Debug, Deserialize)]
struct GraphQlErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorBody>,
}

/// Pulls `data.<field>` out of a response, turning GraphQL errors into
/// [`ClientError::GraphQl`].
fn extract<T: DeserializeOwned>(response: GraphQlResponse, field: &'static str) -> Result<T, ClientError> {
    if !response.errors.is_empty() {
        return Err(ClientError::GraphQl(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let value = response
        .data
        .and_then(|mut data| data.get_mut(field).map(Value::take))
        .ok_or(ClientError::MissingData(field))?;
    Ok(serde_json::from_value(value)?)
}

/// Executes operations against `/graphql`, authenticating with a bearer token
/// once one is known.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn execute<T: DeserializeOwned>(&self, request: &GraphQlRequest) -> Result<T, ClientError> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        debug!(field = request.field, "executing operation");
        let response: GraphQlResponse = builder.send().await?.error_for_status()?.json().await?;
        extract(response, request.field)
    }

    /// Logs in and keeps the returned token for later calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<AuthPayload, ClientError> {
        let payload: AuthPayload = self.execute(&operations::login(username, password)).await?;
        self.token = Some(payload.token.clone());
        Ok(payload)
    }

    /// Registers an account and keeps the returned token.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> Result<AuthPayload, ClientError> {
        let payload: AuthPayload = self.execute(&operations::sign_in(username, password)).await?;
        self.token = Some(payload.token.clone());
        Ok(payload)
    }

    pub async fn sign_out(&mut self) -> Result<bool, ClientError> {
        let result = self.execute(&operations::sign_out()).await;
        self.token = None;
        result
    }

    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        self.execute(&operations::get_current_user()).await
    }

    pub async fn create_username(&self, username: &str) -> Result<CreateUsernameResponse, ClientError> {
        self.execute(&operations::create_username(username)).await
    }

    pub async fn search_users(&self, username: &str) -> Result<Vec<User>, ClientError> {
        self.execute(&operations::search_users(username)).await
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.execute(&operations::conversations()).await
    }

    pub async fn conversation(&self, conversation_id: &str) -> Result<Conversation, ClientError> {
        self.execute(&operations::conversation(conversation_id)).await
    }

    pub async fn create_conversation(&self, participant_ids: &[String]) -> Result<String, ClientError> {
        let response: CreateConversationResponse = self
            .execute(&operations::create_conversation(participant_ids))
            .await?;
        Ok(response.conversation_id)
    }

    pub async fn mark_conversation_as_read(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<bool, ClientError> {
        self.execute(&operations::mark_conversation_as_read(user_id, conversation_id))
            .await
    }

    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<bool, ClientError> {
        self.execute(&operations::delete_conversation(conversation_id)).await
    }

    pub async fn update_participants(
        &self,
        conversation_id: &str,
        participant_ids: &[String],
    ) -> Result<bool, ClientError> {
        self.execute(&operations::update_participants(conversation_id, participant_ids))
            .await
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ClientError> {
        self.execute(&operations::messages(conversation_id)).await
    }

    pub async fn send_message(&self, conversation_id: &str, body: &str) -> Result<bool, ClientError> {
        self.execute(&operations::send_message(conversation_id, body)).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    ConnectionAck,
    Next { id: String, payload: GraphQlResponse },
    Error { id: String, payload: Vec<GraphQlErrorBody> },
    Complete { id: String },
    Ping,
    Pong,
}

async fn send_json(socket: &mut Socket, value: Value) -> Result<(), ClientError> {
    socket.send(Frame::Text(value.to_string().into())).await?;
    Ok(())
}

/// Next protocol message, or `None` once the socket is closed.
async fn next_message(socket: &mut Socket) -> Result<Option<ServerMessage>, ClientError> {
    while let Some(frame) = socket.next().await {
        match frame? {
            Frame::Text(text) => return Ok(Some(serde_json::from_str(text.as_str())?)),
            Frame::Close(_) => return Ok(None),
            _ => {}
        }
    }
    Ok(None)
}

/// Opens one subscription on its own connection.
///
/// The token goes in the `connection_init` payload as `authToken`. The stream
/// yields each `next` result; it ends on `complete`, on `error` (after yielding
/// the error) or when the server closes the socket.
pub async fn subscribe<T>(
    url: &str,
    token: Option<&str>,
    request: GraphQlRequest,
) -> Result<impl Stream<Item = Result<T, ClientError>> + Send + 'static, ClientError>
where
    T: DeserializeOwned + Send + 'static,
{
    let mut handshake = url.into_client_request()?;
    handshake
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("graphql-transport-ws"));
    let (mut socket, _) = connect_async(handshake).await?;

    let init = match token {
        Some(token) => json!({ "type": "connection_init", "payload": { "authToken": token } }),
        None => json!({ "type": "connection_init" }),
    };
    send_json(&mut socket, init).await?;

    loop {
        match next_message(&mut socket).await? {
            Some(ServerMessage::ConnectionAck) => break,
            Some(ServerMessage::Ping) => send_json(&mut socket, json!({ "type": "pong" })).await?,
            Some(other) => {
                return Err(ClientError::Protocol(format!(
                    "expected connection_ack, got {other:?}"
                )));
            }
            None => return Err(ClientError::Protocol("closed before connection_ack".to_string())),
        }
    }

    send_json(
        &mut socket,
        json!({ "id": SUBSCRIPTION_ID, "type": "subscribe", "payload": request }),
    )
    .await?;
    debug!(field = request.field, "subscription started");

    let field = request.field;
    Ok(stream::unfold(Some(socket), move |state| async move {
        let mut socket = state?;
        loop {
            match next_message(&mut socket).await {
                Ok(Some(ServerMessage::Next { id, payload })) if id == SUBSCRIPTION_ID => {
                    return Some((extract(payload, field), Some(socket)));
                }
                Ok(Some(ServerMessage::Error { id, payload })) if id == SUBSCRIPTION_ID => {
                    let messages = payload.into_iter().map(|e| e.message).collect();
                    return Some((Err(ClientError::GraphQl(messages)), None));
                }
                Ok(Some(ServerMessage::Complete { id })) if id == SUBSCRIPTION_ID => return None,
                Ok(Some(ServerMessage::Ping)) => {
                    if let Err(e) = send_json(&mut socket, json!({ "type": "pong" })).await {
                        return Some((Err(e), None));
                    }
                }
                Ok(Some(other)) => warn!(?other, "ignoring unexpected message"),
                Ok(None) => return None,
                Err(e) => return Some((Err(e), None)),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> GraphQlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_data_field() {
        let users: Vec<User> = extract(
            response(json!({ "data": { "searchUsers": [{ "id": "u-1", "username": "bob" }] } })),
            "searchUsers",
        )
        .unwrap();
        assert_eq!(users[0].username, "bob");

        let nobody: Option<User> =
            extract(response(json!({ "data": { "getCurrentUser": null } })), "getCurrentUser").unwrap();
        assert!(nobody.is_none());
    }

    #[test]
    fn test_extract_errors() {
        let err = extract::<bool>(
            response(json!({ "data": null, "errors": [{ "message": "Not authorized" }] })),
            "sendMessage",
        )
        .unwrap_err();
        assert!(err.is_not_authorized());

        let err = extract::<bool>(response(json!({ "data": {} })), "sendMessage").unwrap_err();
        assert!(matches!(err, ClientError::MissingData("sendMessage")));
    }

    #[test]
    fn test_server_messages() {
        let ack: ServerMessage =
            serde_json::from_value(json!({ "type": "connection_ack", "payload": {} })).unwrap();
        assert!(matches!(ack, ServerMessage::ConnectionAck));

        let next: ServerMessage = serde_json::from_value(json!({
            "type": "next",
            "id": "1",
            "payload": { "data": { "messageSent": { "id": "m-1" } } }
        }))
        .unwrap();
        assert!(matches!(next, ServerMessage::Next { ref id, .. } if id == "1"));

        let error: ServerMessage = serde_json::from_value(json!({
            "type": "error",
            "id": "1",
            "payload": [{ "message": "Not authorized" }]
        }))
        .unwrap();
        assert!(matches!(error, ServerMessage::Error { ref payload, .. } if payload[0].message == "Not authorized"));
    }
}
