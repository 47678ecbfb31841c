//! GraphQL output types, built from the populated entities.

use super::scalars::Date;
use crate::entities::{ConversationPopulated, MessagePopulated, ParticipantPopulated, UserSummary};
use async_graphql::SimpleObject;

#[derive(SimpleObject, Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl From<UserSummary> for User {
    fn from(value: UserSummary) -> Self {
        Self {
            id: value.id,
            username: value.username,
        }
    }
}

impl From<crate::entities::User> for User {
    fn from(value: crate::entities::User) -> Self {
        UserSummary::from(value).into()
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Participant {
    pub id: String,
    pub user: User,
    pub has_seen_latest_message: bool,
}

impl From<ParticipantPopulated> for Participant {
    fn from(value: ParticipantPopulated) -> Self {
        Self {
            id: value.participant.id,
            user: value.user.into(),
            has_seen_latest_message: value.participant.has_seen_latest_message,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender: User,
    pub body: String,
    pub created_at: Date,
}

impl From<MessagePopulated> for Message {
    fn from(value: MessagePopulated) -> Self {
        Self {
            id: value.message.id,
            conversation_id: value.message.conversation_id,
            sender: value.sender.into(),
            body: value.message.body,
            created_at: value.message.created_at.into(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<Participant>,
    pub latest_message: Option<Message>,
    pub created_at: Date,
    pub updated_at: Date,
}

impl From<ConversationPopulated> for Conversation {
    fn from(value: ConversationPopulated) -> Self {
        Self {
            id: value.conversation.id,
            participants: value.participants.into_iter().map(Into::into).collect(),
            latest_message: value.latest_message.map(Into::into),
            created_at: value.conversation.created_at.into(),
            updated_at: value.conversation.updated_at.into(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Outcome of a rename. Failures are reported in `error` rather than on the
/// GraphQL error channel.
#[derive(SimpleObject, Clone, Debug, Default)]
pub struct CreateUsernameResponse {
    pub success: Option<bool>,
    pub error: Option<String>,
}

impl CreateUsernameResponse {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(error.into()),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct ConversationUpdatedPayload {
    pub conversation: Conversation,
    pub added_user_ids: Vec<String>,
    pub removed_user_ids: Vec<String>,
}
