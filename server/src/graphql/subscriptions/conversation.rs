use super::deliver;
use crate::core::GqlResult as Result;
use crate::graphql::ext::ContextExt;
use crate::graphql::models::{Conversation, ConversationUpdatedPayload};
use crate::pubsub::{Event, Topic};
use async_graphql::{Context, Subscription};
use futures::Stream;

#[derive(Default)]
pub struct ConversationSubscription;

#[Subscription]
impl ConversationSubscription {
    /// Conversations the caller was made a participant of at creation.
    async fn conversation_created(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = Conversation>> {
        let user_id = ctx.require_session()?.user_id.clone();
        let events = ctx.state().pubsub.subscribe(Topic::ConversationCreated);

        Ok(deliver(events, user_id, None, |event| match event {
            Event::ConversationCreated(conversation) => Some(conversation.clone().into()),
            _ => None,
        }))
    }

    /// New messages, read-state and membership changes. Also reaches users
    /// that were just removed so they can drop the conversation.
    async fn conversation_updated(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = ConversationUpdatedPayload>> {
        let user_id = ctx.require_session()?.user_id.clone();
        let events = ctx.state().pubsub.subscribe(Topic::ConversationUpdated);

        Ok(deliver(events, user_id, None, |event| match event {
            Event::ConversationUpdated {
                conversation,
                added_user_ids,
                removed_user_ids,
            } => Some(ConversationUpdatedPayload {
                conversation: conversation.clone().into(),
                added_user_ids: added_user_ids.clone(),
                removed_user_ids: removed_user_ids.clone(),
            }),
            _ => None,
        }))
    }

    async fn conversation_deleted(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = Conversation>> {
        let user_id = ctx.require_session()?.user_id.clone();
        let events = ctx.state().pubsub.subscribe(Topic::ConversationDeleted);

        Ok(deliver(events, user_id, None, |event| match event {
            Event::ConversationDeleted(conversation) => Some(conversation.clone().into()),
            _ => None,
        }))
    }
}
