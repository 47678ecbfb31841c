//! ConversationRepository - conversations together with their participants
//! and latest message

use super::{Create, Read, new_id};
use crate::dtos::{CreateConversationDTO, CreateParticipantDTO};
use crate::entities::{
    Conversation, ConversationPopulated, MessagePopulated, ParticipantPopulated,
    message::MessageRow, participant::ParticipantRow,
};
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

pub struct ConversationRepository {
    connection_pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(connection_pool: SqlitePool) -> ConversationRepository {
        Self { connection_pool }
    }

    /// Loads one conversation with participants (and their users) and the latest message
    #[instrument(skip(self))]
    pub async fn find_populated(&self, id: &str) -> Result<Option<ConversationPopulated>, Error> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::load_populated(&mut conn, id).await
    }

    /// Every conversation the user participates in, most recently updated first
    #[instrument(skip(self))]
    pub async fn find_many_populated_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversationPopulated>, Error> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT c.id, c.latest_message_id, c.created_at, c.updated_at
            FROM conversations c
            JOIN conversation_participants p ON p.conversation_id = c.id
            WHERE p.user_id = ?
            ORDER BY c.updated_at DESC, c.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Found {} conversations", conversations.len());
        let mut conn = self.connection_pool.acquire().await?;
        Self::populate(&mut conn, conversations).await
    }

    /// Deletes a conversation and returns the snapshot taken just before deletion.
    /// Participants and messages go with it through `ON DELETE CASCADE`.
    ///
    /// The snapshot and the delete share one write transaction, so a message
    /// sent concurrently is either in the snapshot or rejected.
    #[instrument(skip(self))]
    pub async fn delete_cascade(&self, id: &str) -> Result<Option<ConversationPopulated>, Error> {
        let mut tx = self.connection_pool.begin().await?;

        // take the write lock before reading the snapshot
        let touched = sqlx::query("UPDATE conversations SET updated_at = updated_at WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let snapshot = Self::load_populated(&mut tx, id).await?;
        sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(conversation_id = %id, "Conversation deleted");
        Ok(snapshot)
    }

    /// Adds and removes participants in one transaction and bumps `updated_at`.
    /// New participants start with the latest message marked as seen.
    #[instrument(skip(self), fields(add = to_add.len(), remove = to_remove.len()))]
    pub async fn update_participants(
        &self,
        id: &str,
        to_add: &[String],
        to_remove: &[String],
    ) -> Result<Option<ConversationPopulated>, Error> {
        let now = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let touched = sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if !to_remove.is_empty() {
            let mut query_builder = QueryBuilder::<Sqlite>::new(
                "DELETE FROM conversation_participants WHERE conversation_id = ",
            );
            query_builder.push_bind(id).push(" AND user_id IN (");
            let mut separated = query_builder.separated(", ");
            for user_id in to_remove {
                separated.push_bind(user_id);
            }
            separated.push_unseparated(")");
            query_builder.build().execute(&mut *tx).await?;
        }

        for user_id in to_add {
            sqlx::query(
                r#"
                INSERT INTO conversation_participants
                    (id, conversation_id, user_id, has_seen_latest_message, created_at)
                VALUES (?, ?, ?, 1, ?)
                ON CONFLICT (conversation_id, user_id) DO NOTHING
                "#,
            )
            .bind(new_id())
            .bind(id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(conversation_id = %id, "Participants updated");

        self.find_populated(id).await
    }

    async fn load_populated(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<ConversationPopulated>, Error> {
        let Some(conversation) = sqlx::query_as::<_, Conversation>(
            "SELECT id, latest_message_id, created_at, updated_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        else {
            return Ok(None);
        };
        let mut populated = Self::populate(conn, vec![conversation]).await?;
        Ok(populated.pop())
    }

    /// Attaches participants and latest messages to a batch of conversations,
    /// keeping the input order.
    async fn populate(
        conn: &mut SqliteConnection,
        conversations: Vec<Conversation>,
    ) -> Result<Vec<ConversationPopulated>, Error> {
        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT p.id, p.conversation_id, p.user_id, p.has_seen_latest_message, p.created_at,
                   u.username
            FROM conversation_participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.conversation_id IN ("#,
        );
        let mut separated = query_builder.separated(", ");
        for conversation in &conversations {
            separated.push_bind(&conversation.id);
        }
        separated.push_unseparated(") ORDER BY p.created_at ASC, u.username ASC");
        let participant_rows = query_builder
            .build_query_as::<ParticipantRow>()
            .fetch_all(&mut *conn)
            .await?;

        let mut participants: HashMap<String, Vec<ParticipantPopulated>> = HashMap::new();
        for row in participant_rows {
            participants
                .entry(row.conversation_id.clone())
                .or_default()
                .push(row.into());
        }

        let latest_ids: Vec<&String> = conversations
            .iter()
            .filter_map(|c| c.latest_message_id.as_ref())
            .collect();
        let mut latest: HashMap<String, MessagePopulated> = HashMap::new();
        if !latest_ids.is_empty() {
            let mut query_builder = QueryBuilder::<Sqlite>::new(
                r#"
                SELECT m.id, m.conversation_id, m.sender_id, m.body, m.created_at,
                       u.username AS sender_username
                FROM messages m
                JOIN users u ON u.id = m.sender_id
                WHERE m.id IN ("#,
            );
            let mut separated = query_builder.separated(", ");
            for id in latest_ids {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");
            let rows = query_builder
                .build_query_as::<MessageRow>()
                .fetch_all(&mut *conn)
                .await?;
            for row in rows {
                latest.insert(row.id.clone(), row.into());
            }
        }

        Ok(conversations
            .into_iter()
            .map(|conversation| ConversationPopulated {
                participants: participants.remove(&conversation.id).unwrap_or_default(),
                latest_message: conversation
                    .latest_message_id
                    .as_ref()
                    .and_then(|id| latest.remove(id)),
                conversation,
            })
            .collect())
    }
}

impl Create<ConversationPopulated, CreateConversationDTO> for ConversationRepository {
    /// Inserts the conversation and its participants atomically.
    #[instrument(skip(self, data), fields(participants = data.participants.len()))]
    async fn create(&self, data: &CreateConversationDTO) -> Result<ConversationPopulated, Error> {
        let now = Utc::now();
        let conversation = Conversation {
            id: new_id(),
            latest_message_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.connection_pool.begin().await?;

        sqlx::query(
            "INSERT INTO conversations (id, latest_message_id, created_at, updated_at) VALUES (?, NULL, ?, ?)",
        )
        .bind(&conversation.id)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&mut *tx)
        .await?;

        for CreateParticipantDTO {
            user_id,
            has_seen_latest_message,
        } in &data.participants
        {
            sqlx::query(
                r#"
                INSERT INTO conversation_participants
                    (id, conversation_id, user_id, has_seen_latest_message, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(new_id())
            .bind(&conversation.id)
            .bind(user_id)
            .bind(has_seen_latest_message)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(conversation_id = %conversation.id, "Conversation created");

        let mut conn = self.connection_pool.acquire().await?;
        let mut populated = Self::populate(&mut conn, vec![conversation]).await?;
        populated.pop().ok_or(Error::RowNotFound)
    }
}

impl Read<Conversation, String> for ConversationRepository {
    #[instrument(skip(self))]
    async fn read(&self, id: &String) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            "SELECT id, latest_message_id, created_at, updated_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_find_populated(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ConversationRepository::new(pool);
        let conversation = repo.find_populated("c-ab").await?.expect("c-ab exists");

        let mut ids = conversation.participant_ids();
        ids.sort();
        assert_eq!(ids, vec!["u-alice", "u-bob"]);

        let latest = conversation.latest_message.expect("latest message");
        assert_eq!(latest.message.id, "m-ab-2");
        assert_eq!(latest.sender.username, "alice");

        assert!(repo.find_populated("c-missing").await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_list_for_user_is_most_recent_first(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ConversationRepository::new(pool);

        let alice: Vec<_> = repo
            .find_many_populated_for_user("u-alice")
            .await?
            .into_iter()
            .map(|c| c.conversation.id)
            .collect();
        assert_eq!(alice, vec!["c-ac", "c-ab"]);

        let bob = repo.find_many_populated_for_user("u-bob").await?;
        assert_eq!(bob.len(), 1);
        assert!(repo.find_many_populated_for_user("u-dave").await?.is_empty());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_inserts_participants(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ConversationRepository::new(pool);
        let created = repo
            .create(&CreateConversationDTO {
                participants: vec![
                    CreateParticipantDTO {
                        user_id: "u-alice".to_string(),
                        has_seen_latest_message: true,
                    },
                    CreateParticipantDTO {
                        user_id: "u-dave".to_string(),
                        has_seen_latest_message: false,
                    },
                ],
            })
            .await?;

        assert!(created.latest_message.is_none());
        assert_eq!(created.participants.len(), 2);
        let dave = created
            .participants
            .iter()
            .find(|p| p.user.id == "u-dave")
            .expect("dave is a participant");
        assert!(!dave.participant.has_seen_latest_message);
        assert_eq!(dave.user.username, "Dave");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_with_unknown_user_rolls_back(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ConversationRepository::new(pool.clone());
        let result = repo
            .create(&CreateConversationDTO {
                participants: vec![CreateParticipantDTO {
                    user_id: "u-ghost".to_string(),
                    has_seen_latest_message: true,
                }],
            })
            .await;
        assert!(result.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_delete_cascade(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ConversationRepository::new(pool.clone());
        let snapshot = repo.delete_cascade("c-ab").await?.expect("c-ab exists");
        assert_eq!(snapshot.participants.len(), 2);

        assert!(repo.find_populated("c-ab").await?.is_none());
        let messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = 'c-ab'")
            .fetch_one(&pool)
            .await?;
        assert_eq!(messages, 0);

        assert!(repo.delete_cascade("c-ab").await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_delete_cascade_snapshot_is_current(pool: SqlitePool) -> sqlx::Result<()> {
        use crate::dtos::CreateMessageDTO;
        use crate::repositories::MessageRepository;

        let repo = ConversationRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);
        let sent = messages
            .create(&CreateMessageDTO {
                conversation_id: "c-ab".to_string(),
                sender_id: "u-bob".to_string(),
                body: "last words".to_string(),
            })
            .await?;

        let snapshot = repo.delete_cascade("c-ab").await?.expect("c-ab exists");
        let latest = snapshot.latest_message.expect("latest message");
        assert_eq!(latest.message.id, sent.message.id);

        // the conversation is gone, so nothing can be appended to it
        let late = messages
            .create(&CreateMessageDTO {
                conversation_id: "c-ab".to_string(),
                sender_id: "u-alice".to_string(),
                body: "too late".to_string(),
            })
            .await;
        assert!(late.is_err());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "conversations")))]
    async fn test_update_participants(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ConversationRepository::new(pool);
        let updated = repo
            .update_participants("c-ab", &["u-dave".to_string()], &["u-bob".to_string()])
            .await?
            .expect("c-ab exists");

        let mut ids = updated.participant_ids();
        ids.sort();
        assert_eq!(ids, vec!["u-alice", "u-dave"]);

        let dave = updated
            .participants
            .iter()
            .find(|p| p.user.id == "u-dave")
            .expect("dave was added");
        assert!(dave.participant.has_seen_latest_message);
        assert!(updated.conversation.updated_at > updated.conversation.created_at);

        assert!(repo.update_participants("c-missing", &[], &[]).await?.is_none());
        Ok(())
    }
}
