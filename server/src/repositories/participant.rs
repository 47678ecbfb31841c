//! ParticipantRepository - membership rows of conversations

use super::Read;
use crate::entities::ConversationParticipant;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

pub struct ParticipantRepository {
    connection_pool: SqlitePool,
}

impl ParticipantRepository {
    pub fn new(connection_pool: SqlitePool) -> ParticipantRepository {
        Self { connection_pool }
    }

    /// Sets `has_seen_latest_message = true` for one participant.
    /// Returns false when the user is not a participant of the conversation.
    #[instrument(skip(self))]
    pub async fn mark_as_read(&self, conversation_id: &str, user_id: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE conversation_participants
            SET has_seen_latest_message = 1
            WHERE conversation_id = ? AND user_id = ?
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        debug!(rows = result.rows_affected(), "Marked conversation as read");
        Ok(result.rows_affected() > 0)
    }
}

/// Looks up a membership by `(conversation_id, user_id)`
impl Read<ConversationParticipant, (String, String)> for ParticipantRepository {
    #[instrument(skip(self))]
    async fn read(&self, id: &(String, String)) -> Result<Option<ConversationParticipant>, Error> {
        let (conversation_id, user_id) = id;
        sqlx::query_as::<_, ConversationParticipant>(
            r#"
            SELECT id, conversation_id, user_id, has_seen_latest_message, created_at
            FROM conversation_participants
            WHERE conversation_id = ? AND user_id = ?
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_read_membership(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ParticipantRepository::new(pool);
        let bob = repo
            .read(&("c-ab".to_string(), "u-bob".to_string()))
            .await?
            .expect("bob is in c-ab");
        assert!(!bob.has_seen_latest_message);

        assert!(
            repo.read(&("c-ab".to_string(), "u-charlie".to_string()))
                .await?
                .is_none()
        );
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_mark_as_read(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ParticipantRepository::new(pool);
        assert!(repo.mark_as_read("c-ab", "u-bob").await?);
        // idempotent
        assert!(repo.mark_as_read("c-ab", "u-bob").await?);
        assert!(!repo.mark_as_read("c-ab", "u-charlie").await?);

        let bob = repo
            .read(&("c-ab".to_string(), "u-bob".to_string()))
            .await?
            .expect("bob is in c-ab");
        assert!(bob.has_seen_latest_message);
        Ok(())
    }
}
