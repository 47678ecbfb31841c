use crate::core::{GqlError, GqlResult};
use crate::dtos::CreateMessageDTO;
use crate::graphql::ext::ContextExt;
use crate::graphql::guards::membership_guard;
use crate::pubsub::Event;
use crate::repositories::Create;
use crate::services::conversations::validate_message_body;
use async_graphql::{Context, Object};
use tracing::{info, warn};

#[derive(Default)]
pub struct MessageMutation;

#[Object]
impl MessageMutation {
    /// Appends a message from the caller. Publishes the message and the
    /// conversation's new state.
    async fn send_message(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
        body: String,
    ) -> GqlResult<bool> {
        let session = ctx.require_session()?;
        if let Err(message) = validate_message_body(&body) {
            return Err(GqlError::invalid_input("body", message).into());
        }

        let state = ctx.state();
        membership_guard(state, &conversation_id, &session.user_id).await?;

        let message = state
            .msg
            .create(&CreateMessageDTO {
                conversation_id: conversation_id.clone(),
                sender_id: session.user_id.clone(),
                body,
            })
            .await?;
        info!(message_id = %message.message.id, %conversation_id, "Message sent");
        state.pubsub.publish(Event::MessageSent(message));

        match state.conversation.find_populated(&conversation_id).await? {
            Some(conversation) => state.pubsub.publish(Event::ConversationUpdated {
                conversation,
                added_user_ids: Vec::new(),
                removed_user_ids: Vec::new(),
            }),
            None => warn!(%conversation_id, "Conversation vanished after sending a message"),
        }

        Ok(true)
    }
}
