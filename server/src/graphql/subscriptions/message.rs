use super::deliver;
use crate::core::GqlResult as Result;
use crate::graphql::ext::ContextExt;
use crate::graphql::guards::membership_guard;
use crate::graphql::models::Message;
use crate::pubsub::{Event, Topic};
use async_graphql::{Context, Subscription};
use futures::Stream;

#[derive(Default)]
pub struct MessageSubscription;

#[Subscription]
impl MessageSubscription {
    /// Messages sent to one conversation. The caller must take part in it
    /// when subscribing.
    async fn message_sent(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
    ) -> Result<impl Stream<Item = Message>> {
        let user_id = ctx.require_session()?.user_id.clone();
        let state = ctx.state();
        membership_guard(state, &conversation_id, &user_id).await?;

        let events = state.pubsub.subscribe(Topic::MessageSent);
        Ok(deliver(events, user_id, Some(conversation_id), |event| match event {
            Event::MessageSent(message) => Some(message.clone().into()),
            _ => None,
        }))
    }
}
