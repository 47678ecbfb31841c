//! GraphQL documents sent by the client, and the request envelope.

use serde::Serialize;
use serde_json::{Value, json};

macro_rules! conversation_fields {
    () => {
        "id createdAt updatedAt \
         participants { id user { id username } hasSeenLatestMessage } \
         latestMessage { id conversationId sender { id username } body createdAt }"
    };
}

pub const SEARCH_USERS: &str =
    "query SearchUsers($username: String!) { searchUsers(username: $username) { id username } }";

pub const GET_CURRENT_USER: &str = "query GetCurrentUser { getCurrentUser { id username } }";

pub const CREATE_USERNAME: &str = "mutation CreateUsername($username: String!) { \
     createUsername(username: $username) { success error } }";

pub const SIGN_IN: &str = "mutation SignIn($username: String!, $password: String!) { \
     signIn(username: $username, password: $password) { token user { id username } } }";

pub const LOGIN: &str = "mutation Login($username: String!, $password: String!) { \
     login(username: $username, password: $password) { token user { id username } } }";

pub const SIGN_OUT: &str = "mutation SignOut { signOut }";

pub const CONVERSATIONS: &str =
    concat!("query Conversations { conversations { ", conversation_fields!(), " } }");

pub const CONVERSATION: &str = concat!(
    "query Conversation($conversationId: String!) { conversation(conversationId: $conversationId) { ",
    conversation_fields!(),
    " } }"
);

pub const CREATE_CONVERSATION: &str = "mutation CreateConversation($participantIds: [String!]!) { \
     createConversation(participantIds: $participantIds) { conversationId } }";

pub const MARK_CONVERSATION_AS_READ: &str =
    "mutation MarkConversationAsRead($userId: String!, $conversationId: String!) { \
     markConversationAsRead(userId: $userId, conversationId: $conversationId) }";

pub const DELETE_CONVERSATION: &str = "mutation DeleteConversation($conversationId: String!) { \
     deleteConversation(conversationId: $conversationId) }";

pub const UPDATE_PARTICIPANTS: &str =
    "mutation UpdateParticipants($conversationId: String!, $participantIds: [String!]!) { \
     updateParticipants(conversationId: $conversationId, participantIds: $participantIds) }";

pub const MESSAGES: &str = "query Messages($conversationId: String!) { \
     messages(conversationId: $conversationId) { \
     id conversationId sender { id username } body createdAt } }";

pub const SEND_MESSAGE: &str = "mutation SendMessage($conversationId: String!, $body: String!) { \
     sendMessage(conversationId: $conversationId, body: $body) }";

pub const CONVERSATION_CREATED: &str = concat!(
    "subscription ConversationCreated { conversationCreated { ",
    conversation_fields!(),
    " } }"
);

pub const CONVERSATION_UPDATED: &str = concat!(
    "subscription ConversationUpdated { conversationUpdated { conversation { ",
    conversation_fields!(),
    " } addedUserIds removedUserIds } }"
);

pub const CONVERSATION_DELETED: &str =
    "subscription ConversationDeleted { conversationDeleted { id } }";

pub const MESSAGE_SENT: &str = "subscription MessageSent($conversationId: String!) { \
     messageSent(conversationId: $conversationId) { \
     id conversationId sender { id username } body createdAt } }";

/// Body of a GraphQL request, also used as the `subscribe` payload over WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Value,
    /// Top-level field holding the result in `data`.
    #[serde(skip)]
    pub field: &'static str,
}

impl GraphQlRequest {
    pub fn new(query: &'static str, field: &'static str, variables: Value) -> Self {
        Self {
            query,
            variables,
            field,
        }
    }
}

pub fn search_users(username: &str) -> GraphQlRequest {
    GraphQlRequest::new(SEARCH_USERS, "searchUsers", json!({ "username": username }))
}

pub fn get_current_user() -> GraphQlRequest {
    GraphQlRequest::new(GET_CURRENT_USER, "getCurrentUser", json!({}))
}

pub fn create_username(username: &str) -> GraphQlRequest {
    GraphQlRequest::new(CREATE_USERNAME, "createUsername", json!({ "username": username }))
}

pub fn sign_in(username: &str, password: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        SIGN_IN,
        "signIn",
        json!({ "username": username, "password": password }),
    )
}

pub fn login(username: &str, password: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        LOGIN,
        "login",
        json!({ "username": username, "password": password }),
    )
}

pub fn sign_out() -> GraphQlRequest {
    GraphQlRequest::new(SIGN_OUT, "signOut", json!({}))
}

pub fn conversations() -> GraphQlRequest {
    GraphQlRequest::new(CONVERSATIONS, "conversations", json!({}))
}

pub fn conversation(conversation_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        CONVERSATION,
        "conversation",
        json!({ "conversationId": conversation_id }),
    )
}

pub fn create_conversation(participant_ids: &[String]) -> GraphQlRequest {
    GraphQlRequest::new(
        CREATE_CONVERSATION,
        "createConversation",
        json!({ "participantIds": participant_ids }),
    )
}

pub fn mark_conversation_as_read(user_id: &str, conversation_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        MARK_CONVERSATION_AS_READ,
        "markConversationAsRead",
        json!({ "userId": user_id, "conversationId": conversation_id }),
    )
}

pub fn delete_conversation(conversation_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        DELETE_CONVERSATION,
        "deleteConversation",
        json!({ "conversationId": conversation_id }),
    )
}

pub fn update_participants(conversation_id: &str, participant_ids: &[String]) -> GraphQlRequest {
    GraphQlRequest::new(
        UPDATE_PARTICIPANTS,
        "updateParticipants",
        json!({ "conversationId": conversation_id, "participantIds": participant_ids }),
    )
}

pub fn messages(conversation_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(MESSAGES, "messages", json!({ "conversationId": conversation_id }))
}

pub fn send_message(conversation_id: &str, body: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        SEND_MESSAGE,
        "sendMessage",
        json!({ "conversationId": conversation_id, "body": body }),
    )
}

pub fn conversation_created() -> GraphQlRequest {
    GraphQlRequest::new(CONVERSATION_CREATED, "conversationCreated", json!({}))
}

pub fn conversation_updated() -> GraphQlRequest {
    GraphQlRequest::new(CONVERSATION_UPDATED, "conversationUpdated", json!({}))
}

pub fn conversation_deleted() -> GraphQlRequest {
    GraphQlRequest::new(CONVERSATION_DELETED, "conversationDeleted", json!({}))
}

pub fn message_sent(conversation_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(
        MESSAGE_SENT,
        "messageSent",
        json!({ "conversationId": conversation_id }),
    )
}
