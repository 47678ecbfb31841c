//! Conversation entity

use super::{MessagePopulated, ParticipantPopulated};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub id: String,
    // the message shown in conversation lists, None until the first message
    pub latest_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversationPopulated {
    pub conversation: Conversation,
    pub participants: Vec<ParticipantPopulated>,
    pub latest_message: Option<MessagePopulated>,
}

impl ConversationPopulated {
    pub fn id(&self) -> &str {
        &self.conversation.id
    }

    pub fn participant_ids(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|p| p.participant.user_id.clone())
            .collect()
    }
}
