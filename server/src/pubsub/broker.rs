use crate::entities::{ConversationPopulated, MessagePopulated};
use dashmap::DashMap;
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ConversationCreated,
    ConversationUpdated,
    ConversationDeleted,
    MessageSent,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConversationCreated => write!(f, "conversation.created"),
            Self::ConversationUpdated => write!(f, "conversation.updated"),
            Self::ConversationDeleted => write!(f, "conversation.deleted"),
            Self::MessageSent => write!(f, "message.sent"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    ConversationCreated(ConversationPopulated),
    ConversationUpdated {
        conversation: ConversationPopulated,
        added_user_ids: Vec<String>,
        removed_user_ids: Vec<String>,
    },
    ConversationDeleted(ConversationPopulated),
    MessageSent(MessagePopulated),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Self::ConversationCreated(_) => Topic::ConversationCreated,
            Self::ConversationUpdated { .. } => Topic::ConversationUpdated,
            Self::ConversationDeleted(_) => Topic::ConversationDeleted,
            Self::MessageSent(_) => Topic::MessageSent,
        }
    }
}

/// One broadcast channel per topic, created on first use.
pub struct PubSub {
    topics: DashMap<Topic, broadcast::Sender<Arc<Event>>>,
    capacity: usize,
}

impl PubSub {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, topic: Topic) -> broadcast::Sender<Arc<Event>> {
        self.topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Publishes on the event's topic. Never fails: an event with no live
    /// subscriber is dropped.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        match self.sender(topic).send(Arc::new(event)) {
            Ok(receivers) => debug!(%topic, receivers, "event published"),
            Err(_) => debug!(%topic, "event published with no subscribers"),
        }
    }

    /// Live events of `topic` from now on. A subscriber that falls more than
    /// `capacity` events behind skips the gap.
    pub fn subscribe(&self, topic: Topic) -> impl Stream<Item = Arc<Event>> + Send + 'static {
        BroadcastStream::new(self.sender(topic).subscribe()).filter_map(move |item| async move {
            match item {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(%topic, skipped, "subscriber lagged, events dropped");
                    None
                }
            }
        })
    }

    pub fn receiver_count(&self, topic: Topic) -> usize {
        self.topics
            .get(&topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Message, UserSummary};
    use chrono::Utc;

    fn message(id: &str) -> Event {
        Event::MessageSent(MessagePopulated {
            message: Message {
                id: id.to_string(),
                conversation_id: "c-1".to_string(),
                sender_id: "u-1".to_string(),
                body: "hello".to_string(),
                created_at: Utc::now(),
            },
            sender: UserSummary {
                id: "u-1".to_string(),
                username: "alice".to_string(),
            },
        })
    }

    fn message_id(event: &Event) -> &str {
        match event {
            Event::MessageSent(m) => &m.message.id,
            _ => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let pubsub = PubSub::new(4);
        pubsub.publish(message("m-1"));
        assert_eq!(pubsub.receiver_count(Topic::MessageSent), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_only_its_topic() {
        let pubsub = PubSub::new(4);
        let stream = pubsub.subscribe(Topic::MessageSent);
        tokio::pin!(stream);

        pubsub.publish(Event::ConversationDeleted(ConversationPopulated {
            conversation: crate::entities::Conversation {
                id: "c-1".to_string(),
                latest_message_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            participants: vec![],
            latest_message: None,
        }));
        pubsub.publish(message("m-1"));

        let event = stream.next().await.expect("an event");
        assert_eq!(message_id(&event), "m-1");
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_gap() {
        let pubsub = PubSub::new(2);
        let stream = pubsub.subscribe(Topic::MessageSent);
        tokio::pin!(stream);

        for i in 0..5 {
            pubsub.publish(message(&format!("m-{i}")));
        }

        // only the last `capacity` events survive
        let first = stream.next().await.expect("an event");
        assert_eq!(message_id(&first), "m-3");
        let second = stream.next().await.expect("an event");
        assert_eq!(message_id(&second), "m-4");
    }
}
