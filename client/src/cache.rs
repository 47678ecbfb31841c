//! Local state the UI renders, and how server events are folded into it.

use crate::models::{Conversation, ConversationUpdated, Message, User};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Conversations the viewer belongs to, most recently updated first.
#[derive(Debug, Clone, Default)]
pub struct ConversationCache {
    conversations: Vec<Conversation>,
}

/// Undo information for [`ConversationCache::mark_read_optimistic`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ReadRollback {
    conversation_id: String,
    user_id: String,
}

impl ConversationCache {
    pub fn new(mut conversations: Vec<Conversation>) -> Self {
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Self { conversations }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    fn position(&self, conversation_id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == conversation_id)
    }

    /// Returns false when the conversation was already known.
    pub fn apply_created(&mut self, conversation: Conversation) -> bool {
        if self.position(&conversation.id).is_some() {
            return false;
        }
        self.conversations.insert(0, conversation);
        true
    }

    pub fn apply_updated(&mut self, update: ConversationUpdated, viewer_id: &str) {
        let existing = self.position(&update.conversation.id);
        if update.removed_user_ids.iter().any(|id| id == viewer_id) {
            if let Some(index) = existing {
                debug!(conversation_id = %update.conversation.id, "viewer removed from conversation");
                self.conversations.remove(index);
            }
            return;
        }

        if let Some(index) = existing {
            self.conversations.remove(index);
        }
        self.conversations.insert(0, update.conversation);
    }

    pub fn apply_deleted(&mut self, conversation_id: &str) -> Option<Conversation> {
        let index = self.position(conversation_id)?;
        Some(self.conversations.remove(index))
    }

    /// Flags the viewer's participant as caught up before the server confirms.
    /// Returns `None` if there was nothing to change.
    pub fn mark_read_optimistic(
        &mut self,
        conversation_id: &str,
        viewer_id: &str,
    ) -> Option<ReadRollback> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)?;
        let participant = conversation
            .participants
            .iter_mut()
            .find(|p| p.user.id == viewer_id && !p.has_seen_latest_message)?;
        participant.has_seen_latest_message = true;

        Some(ReadRollback {
            conversation_id: conversation_id.to_string(),
            user_id: viewer_id.to_string(),
        })
    }

    /// Restores the unread flag after `markConversationAsRead` failed.
    pub fn rollback(&mut self, token: ReadRollback) {
        let participant = self
            .conversations
            .iter_mut()
            .find(|c| c.id == token.conversation_id)
            .and_then(|c| c.participants.iter_mut().find(|p| p.user.id == token.user_id));
        if let Some(participant) = participant {
            participant.has_seen_latest_message = false;
        }
    }

    pub fn unread_count(&self, viewer_id: &str) -> usize {
        self.conversations
            .iter()
            .filter(|c| c.is_unread_for(viewer_id))
            .count()
    }
}

const PENDING_PREFIX: &str = "pending-";

/// Messages of one conversation in ascending `created_at` order, followed by
/// local echoes that the server has not broadcast yet.
#[derive(Debug, Clone)]
pub struct MessageThread {
    conversation_id: String,
    messages: Vec<Message>,
    pending: Vec<Message>,
    next_pending: u64,
}

impl MessageThread {
    pub fn new(conversation_id: impl Into<String>, mut messages: Vec<Message>) -> Self {
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Self {
            conversation_id: conversation_id.into(),
            messages,
            pending: Vec::new(),
            next_pending: 0,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Confirmed messages, then pending ones.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().chain(self.pending.iter())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Inserts a `messageSent` payload. A pending echo with the same sender
    /// and body is replaced. Returns false for duplicates and messages of
    /// other conversations.
    pub fn apply_sent(&mut self, message: Message) -> bool {
        if message.conversation_id != self.conversation_id
            || self.messages.iter().any(|m| m.id == message.id)
        {
            return false;
        }

        if let Some(index) = self
            .pending
            .iter()
            .position(|p| p.sender.id == message.sender.id && p.body == message.body)
        {
            self.pending.remove(index);
        }

        let at = self
            .messages
            .partition_point(|m| m.created_at <= message.created_at);
        self.messages.insert(at, message);
        true
    }

    /// Shows a message immediately while `sendMessage` is in flight.
    /// Returns the local id of the echo.
    pub fn push_pending(
        &mut self,
        sender: User,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> String {
        self.next_pending += 1;
        let id = format!("{PENDING_PREFIX}{}", self.next_pending);
        self.pending.push(Message {
            id: id.clone(),
            conversation_id: self.conversation_id.clone(),
            sender,
            body: body.into(),
            created_at,
        });
        id
    }

    /// Drops an echo whose send failed.
    pub fn discard_pending(&mut self, local_id: &str) -> Option<Message> {
        let index = self.pending.iter().position(|m| m.id == local_id)?;
        Some(self.pending.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;
    use chrono::TimeZone;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: id.trim_start_matches("u-").to_string(),
        }
    }

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 10, minute, 0).unwrap()
    }

    fn conversation(id: &str, members: &[(&str, bool)], minute: u32) -> Conversation {
        Conversation {
            id: id.to_string(),
            participants: members
                .iter()
                .map(|(user_id, seen)| Participant {
                    id: format!("p-{id}-{user_id}"),
                    user: user(user_id),
                    has_seen_latest_message: *seen,
                })
                .collect(),
            latest_message: None,
            created_at: ts(0),
            updated_at: ts(minute),
        }
    }

    fn message(id: &str, conversation_id: &str, sender: &str, body: &str, minute: u32) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender: user(sender),
            body: body.to_string(),
            created_at: ts(minute),
        }
    }

    fn ids(cache: &ConversationCache) -> Vec<&str> {
        cache.conversations().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_new_orders_most_recent_first() {
        let cache = ConversationCache::new(vec![
            conversation("c-1", &[("u-alice", true)], 1),
            conversation("c-3", &[("u-alice", true)], 3),
            conversation("c-2", &[("u-alice", true)], 2),
        ]);
        assert_eq!(ids(&cache), ["c-3", "c-2", "c-1"]);
    }

    #[test]
    fn test_apply_created_ignores_duplicates() {
        let mut cache = ConversationCache::new(vec![conversation("c-1", &[("u-alice", true)], 1)]);
        assert!(cache.apply_created(conversation("c-2", &[("u-alice", true)], 2)));
        assert!(!cache.apply_created(conversation("c-2", &[("u-alice", true)], 2)));
        assert_eq!(ids(&cache), ["c-2", "c-1"]);
    }

    #[test]
    fn test_apply_updated_moves_to_front() {
        let mut cache = ConversationCache::new(vec![
            conversation("c-2", &[("u-alice", true)], 2),
            conversation("c-1", &[("u-alice", true), ("u-bob", true)], 1),
        ]);

        cache.apply_updated(
            ConversationUpdated {
                conversation: conversation("c-1", &[("u-alice", false), ("u-bob", true)], 5),
                added_user_ids: Vec::new(),
                removed_user_ids: Vec::new(),
            },
            "u-alice",
        );

        assert_eq!(ids(&cache), ["c-1", "c-2"]);
        assert!(cache.conversations()[0].is_unread_for("u-alice"));
        assert_eq!(cache.unread_count("u-alice"), 1);
    }

    #[test]
    fn test_apply_updated_inserts_when_added() {
        let mut cache = ConversationCache::default();
        cache.apply_updated(
            ConversationUpdated {
                conversation: conversation("c-1", &[("u-alice", true), ("u-bob", true)], 3),
                added_user_ids: vec!["u-bob".to_string()],
                removed_user_ids: Vec::new(),
            },
            "u-bob",
        );
        assert_eq!(ids(&cache), ["c-1"]);
    }

    #[test]
    fn test_apply_updated_removes_when_viewer_removed() {
        let mut cache = ConversationCache::new(vec![conversation(
            "c-1",
            &[("u-alice", true), ("u-bob", true)],
            1,
        )]);
        cache.apply_updated(
            ConversationUpdated {
                conversation: conversation("c-1", &[("u-alice", true)], 2),
                added_user_ids: Vec::new(),
                removed_user_ids: vec!["u-bob".to_string()],
            },
            "u-bob",
        );
        assert!(cache.conversations().is_empty());
    }

    #[test]
    fn test_apply_deleted() {
        let mut cache = ConversationCache::new(vec![conversation("c-1", &[("u-alice", true)], 1)]);
        assert_eq!(cache.apply_deleted("c-1").map(|c| c.id), Some("c-1".to_string()));
        assert!(cache.apply_deleted("c-1").is_none());
    }

    #[test]
    fn test_mark_read_and_rollback() {
        let mut cache = ConversationCache::new(vec![conversation(
            "c-1",
            &[("u-alice", true), ("u-bob", false)],
            1,
        )]);
        assert!(cache.mark_read_optimistic("c-1", "u-alice").is_none());

        let token = cache.mark_read_optimistic("c-1", "u-bob").unwrap();
        assert_eq!(cache.unread_count("u-bob"), 0);

        cache.rollback(token);
        assert_eq!(cache.unread_count("u-bob"), 1);
    }

    #[test]
    fn test_thread_orders_and_deduplicates() {
        let mut thread = MessageThread::new(
            "c-1",
            vec![
                message("m-3", "c-1", "u-bob", "third", 3),
                message("m-1", "c-1", "u-alice", "first", 1),
            ],
        );

        assert!(thread.apply_sent(message("m-2", "c-1", "u-alice", "second", 2)));
        assert!(!thread.apply_sent(message("m-2", "c-1", "u-alice", "second", 2)));
        assert!(!thread.apply_sent(message("m-9", "c-2", "u-alice", "elsewhere", 4)));

        let bodies: Vec<&str> = thread.messages().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);
    }

    #[test]
    fn test_pending_echo_is_replaced() {
        let mut thread = MessageThread::new("c-1", Vec::new());
        let local_id = thread.push_pending(user("u-alice"), "hello", ts(1));
        assert!(local_id.starts_with(PENDING_PREFIX));
        assert_eq!(thread.pending_count(), 1);

        assert!(thread.apply_sent(message("m-1", "c-1", "u-alice", "hello", 1)));
        assert_eq!(thread.pending_count(), 0);
        let ids: Vec<&str> = thread.messages().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m-1"]);
    }

    #[test]
    fn test_discard_pending() {
        let mut thread = MessageThread::new("c-1", Vec::new());
        let local_id = thread.push_pending(user("u-alice"), "oops", ts(1));
        assert_eq!(thread.discard_pending(&local_id).map(|m| m.body), Some("oops".to_string()));
        assert_eq!(thread.messages().count(), 0);
    }
}
