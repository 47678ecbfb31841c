use crate::core::GqlResult;
use crate::graphql::ext::ContextExt;
use crate::graphql::guards::participant_guard;
use crate::graphql::models::Conversation;
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct ConversationQuery;

#[Object]
impl ConversationQuery {
    /// Conversations of the caller, most recently updated first.
    async fn conversations(&self, ctx: &Context<'_>) -> GqlResult<Vec<Conversation>> {
        let session = ctx.require_session()?;
        let conversations = ctx
            .state()
            .conversation
            .find_many_populated_for_user(&session.user_id)
            .await?;

        Ok(conversations.into_iter().map(Into::into).collect())
    }

    async fn conversation(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
    ) -> GqlResult<Conversation> {
        let session = ctx.require_session()?;
        let conversation = participant_guard(ctx.state(), &conversation_id, &session.user_id).await?;
        Ok(conversation.into())
    }
}
