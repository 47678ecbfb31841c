//! Per-subscriber delivery rules for published events

use super::Event;
use crate::services::conversations::is_participant;

/// Whether `event` should reach the subscription of `user_id`.
/// `conversation_id` is the argument of a `messageSent` subscription.
pub fn should_deliver(event: &Event, user_id: &str, conversation_id: Option<&str>) -> bool {
    match event {
        Event::ConversationCreated(conversation) | Event::ConversationDeleted(conversation) => {
            is_participant(&conversation.participants, user_id)
        }
        Event::ConversationUpdated {
            conversation,
            removed_user_ids,
            ..
        } => {
            let sent_latest = conversation
                .latest_message
                .as_ref()
                .is_some_and(|m| m.sender.id == user_id);
            is_participant(&conversation.participants, user_id)
                || sent_latest
                || removed_user_ids.iter().any(|id| id == user_id)
        }
        Event::MessageSent(message) => {
            conversation_id.is_some_and(|id| id == message.message.conversation_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        Conversation, ConversationParticipant, ConversationPopulated, Message, MessagePopulated,
        ParticipantPopulated, UserSummary,
    };
    use chrono::Utc;

    fn user(id: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            username: id.trim_start_matches("u-").to_string(),
        }
    }

    fn message(conversation_id: &str, sender: &str) -> MessagePopulated {
        MessagePopulated {
            message: Message {
                id: "m-1".to_string(),
                conversation_id: conversation_id.to_string(),
                sender_id: sender.to_string(),
                body: "hello".to_string(),
                created_at: Utc::now(),
            },
            sender: user(sender),
        }
    }

    fn conversation(participants: &[&str], latest_from: Option<&str>) -> ConversationPopulated {
        let now = Utc::now();
        ConversationPopulated {
            conversation: Conversation {
                id: "c-1".to_string(),
                latest_message_id: latest_from.map(|_| "m-1".to_string()),
                created_at: now,
                updated_at: now,
            },
            participants: participants
                .iter()
                .map(|id| ParticipantPopulated {
                    participant: ConversationParticipant {
                        id: format!("p-{id}"),
                        conversation_id: "c-1".to_string(),
                        user_id: id.to_string(),
                        has_seen_latest_message: false,
                        created_at: now,
                    },
                    user: user(id),
                })
                .collect(),
            latest_message: latest_from.map(|sender| message("c-1", sender)),
        }
    }

    #[test]
    fn test_created_and_deleted_reach_participants_only() {
        let created = Event::ConversationCreated(conversation(&["u-alice", "u-bob"], None));
        assert!(should_deliver(&created, "u-bob", None));
        assert!(!should_deliver(&created, "u-charlie", None));

        let deleted = Event::ConversationDeleted(conversation(&["u-alice"], None));
        assert!(should_deliver(&deleted, "u-alice", None));
        assert!(!should_deliver(&deleted, "u-bob", None));
    }

    #[test]
    fn test_updated_reaches_removed_users_and_latest_sender() {
        let updated = Event::ConversationUpdated {
            conversation: conversation(&["u-alice"], Some("u-dave")),
            added_user_ids: vec![],
            removed_user_ids: vec!["u-bob".to_string()],
        };
        assert!(should_deliver(&updated, "u-alice", None));
        assert!(should_deliver(&updated, "u-bob", None));
        assert!(should_deliver(&updated, "u-dave", None));
        assert!(!should_deliver(&updated, "u-charlie", None));
    }

    #[test]
    fn test_message_sent_matches_requested_conversation() {
        let sent = Event::MessageSent(message("c-1", "u-alice"));
        assert!(should_deliver(&sent, "u-bob", Some("c-1")));
        assert!(!should_deliver(&sent, "u-bob", Some("c-2")));
        assert!(!should_deliver(&sent, "u-bob", None));
    }
}
