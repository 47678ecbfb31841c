//! ConversationParticipant entity - membership and read-state of a user in a conversation

use super::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ConversationParticipant {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    // false as soon as someone else posts, true again once the user reads
    pub has_seen_latest_message: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParticipantPopulated {
    pub participant: ConversationParticipant,
    pub user: UserSummary,
}

/// Row shape of a participant joined with its user.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ParticipantRow {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub has_seen_latest_message: bool,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

impl From<ParticipantRow> for ParticipantPopulated {
    fn from(row: ParticipantRow) -> Self {
        Self {
            user: UserSummary {
                id: row.user_id.clone(),
                username: row.username,
            },
            participant: ConversationParticipant {
                id: row.id,
                conversation_id: row.conversation_id,
                user_id: row.user_id,
                has_seen_latest_message: row.has_seen_latest_message,
                created_at: row.created_at,
            },
        }
    }
}
