//! Message entity

use super::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessagePopulated {
    pub message: Message,
    pub sender: UserSummary,
}

/// Row shape of a message joined with its sender.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub sender_username: String,
}

impl From<MessageRow> for MessagePopulated {
    fn from(row: MessageRow) -> Self {
        Self {
            sender: UserSummary {
                id: row.sender_id.clone(),
                username: row.sender_username,
            },
            message: Message {
                id: row.id,
                conversation_id: row.conversation_id,
                sender_id: row.sender_id,
                body: row.body,
                created_at: row.created_at,
            },
        }
    }
}
