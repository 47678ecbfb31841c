//! MessageRepository - messages of a conversation

use super::{Create, new_id};
use crate::dtos::CreateMessageDTO;
use crate::entities::{Message, MessagePopulated, message::MessageRow};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> MessageRepository {
        Self { connection_pool }
    }

    /// All messages of a conversation, oldest first (insertion order breaks ties)
    #[instrument(skip(self))]
    pub async fn find_many_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<MessagePopulated>, Error> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.body, m.created_at,
                   u.username AS sender_username
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.conversation_id = ?
            ORDER BY m.created_at ASC, m.rowid ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Found {} messages", rows.len());
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn find_populated(&self, id: &str) -> Result<Option<MessagePopulated>, Error> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.body, m.created_at,
                   u.username AS sender_username
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

impl Create<MessagePopulated, CreateMessageDTO> for MessageRepository {
    /// Inserts the message and, in the same transaction, makes it the latest
    /// message of its conversation: only the sender keeps it marked as seen.
    #[instrument(skip(self, data), fields(conversation_id = %data.conversation_id))]
    async fn create(&self, data: &CreateMessageDTO) -> Result<MessagePopulated, Error> {
        let message = Message {
            id: new_id(),
            conversation_id: data.conversation_id.clone(),
            sender_id: data.sender_id.clone(),
            body: data.body.clone(),
            created_at: Utc::now(),
        };

        let mut tx = self.connection_pool.begin().await?;

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(&message.sender_id)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET latest_message_id = ?, updated_at = ? WHERE id = ?")
            .bind(&message.id)
            .bind(message.created_at)
            .bind(&message.conversation_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE conversation_participants
            SET has_seen_latest_message = (user_id = ?)
            WHERE conversation_id = ?
            "#,
        )
        .bind(&message.sender_id)
        .bind(&message.conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(message_id = %message.id, "Message stored");

        self.find_populated(&message.id)
            .await?
            .ok_or(Error::RowNotFound)
    }
}
