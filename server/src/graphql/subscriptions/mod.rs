use crate::pubsub::{Event, filters::should_deliver};
use async_graphql::MergedSubscription;
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::sync::Arc;

mod conversation;
mod message;

#[derive(MergedSubscription, Default)]
pub struct Subscription(
    conversation::ConversationSubscription,
    message::MessageSubscription,
);

/// Turns raw topic events into the payloads one subscriber is allowed to see.
fn deliver<T, F>(
    events: impl Stream<Item = Arc<Event>> + Send + 'static,
    user_id: String,
    conversation_id: Option<String>,
    project: F,
) -> impl Stream<Item = T> + Send + 'static
where
    T: Send + 'static,
    F: Fn(&Event) -> Option<T> + Send + 'static,
{
    stream!({
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            if !should_deliver(&event, &user_id, conversation_id.as_deref()) {
                continue;
            }
            if let Some(item) = project(&event) {
                yield item;
            }
        }
    })
}
