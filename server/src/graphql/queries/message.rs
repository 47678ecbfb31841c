use crate::core::GqlResult;
use crate::graphql::ext::ContextExt;
use crate::graphql::guards::membership_guard;
use crate::graphql::models::Message;
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct MessageQuery;

#[Object]
impl MessageQuery {
    /// Messages of a conversation the caller takes part in, oldest first.
    async fn messages(&self, ctx: &Context<'_>, conversation_id: String) -> GqlResult<Vec<Message>> {
        let session = ctx.require_session()?;
        let state = ctx.state();
        membership_guard(state, &conversation_id, &session.user_id).await?;

        let messages = state.msg.find_many_by_conversation(&conversation_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}
